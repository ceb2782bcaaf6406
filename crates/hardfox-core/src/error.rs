//! Error types for hardfox-core

use std::path::PathBuf;

use hardfox_catalog::ValidationError;

/// Result type for hardfox-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hardfox-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more profile values violate the catalog. Raised before any write.
    #[error("Profile '{name}' has {} invalid value(s): {}", violations.len(), summarize(violations))]
    InvalidProfile {
        name: String,
        violations: Vec<ValidationError>,
    },

    /// Another apply is already running against this directory
    #[error("An apply is already in progress for {path}")]
    Busy { path: PathBuf },

    #[error("Profile not found: {name}")]
    ProfileNotFound { name: String },

    #[error("Invalid profile name '{name}': {reason}")]
    InvalidProfileName { name: String, reason: String },

    #[error("Unsupported profile document version {version}")]
    UnsupportedVersion { version: String },

    #[error("Invalid profile document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] hardfox_fs::Error),

    #[error(transparent)]
    Prefs(#[from] hardfox_prefs::Error),

    #[error(transparent)]
    Catalog(#[from] hardfox_catalog::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error rejected a path before anything was written.
    pub fn is_path_error(&self) -> bool {
        match self {
            Self::Fs(e) => e.is_path_error(),
            Self::Prefs(e) => e.is_path_error(),
            _ => false,
        }
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidProfile { .. }
                | Self::Validation(_)
                | Self::Catalog(hardfox_catalog::Error::Validation(_))
        )
    }
}

fn summarize(violations: &[ValidationError]) -> String {
    match violations {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
