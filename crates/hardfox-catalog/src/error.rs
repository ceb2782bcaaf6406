//! Error types for hardfox-catalog

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] hardfox_fs::Error),

    #[error("Invalid catalog: {message}")]
    InvalidCatalog { message: String },

    #[error("Failed to read catalog {path}: {message}")]
    CatalogParse { path: PathBuf, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Preset not found: {id}")]
    PresetNotFound { id: String },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }
}

/// A value that does not satisfy its catalog entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown setting '{key}'")]
    UnknownKey { key: String },

    #[error("'{key}' expects a {expected} value, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{key}' = {value} is outside {min}..={max}")]
    OutOfRange {
        key: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("'{key}' = {value} is not a multiple of {step} from {min}")]
    Misaligned {
        key: String,
        value: String,
        min: String,
        step: String,
    },

    #[error("'{key}' = {value} is not one of [{options}]")]
    NotAnOption {
        key: String,
        value: String,
        options: String,
    },
}

impl ValidationError {
    /// The setting key the violation belongs to.
    pub fn key(&self) -> &str {
        match self {
            Self::UnknownKey { key }
            | Self::WrongType { key, .. }
            | Self::OutOfRange { key, .. }
            | Self::Misaligned { key, .. }
            | Self::NotAnOption { key, .. } => key,
        }
    }
}
