//! Error types for hardfox-fs

use std::path::PathBuf;

/// Result type for hardfox-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hardfox-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {path} escapes the permitted directory {root}")]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error("Refusing untrusted path {path}: {reason}")]
    UntrustedPath { path: PathBuf, reason: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Another operation is already in progress for {path}")]
    Busy { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn untrusted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UntrustedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for the errors that reject a path before any disk mutation.
    pub fn is_path_error(&self) -> bool {
        matches!(self, Self::PathEscape { .. } | Self::UntrustedPath { .. })
    }
}
