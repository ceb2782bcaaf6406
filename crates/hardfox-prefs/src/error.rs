//! Error types for hardfox-prefs

use std::path::PathBuf;

/// Result type for hardfox-prefs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing preference files.
///
/// Malformed lines are never errors; they surface as
/// [`ParseWarning`](crate::ParseWarning)s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] hardfox_fs::Error),

    #[error("Profile root {path} is not a directory")]
    NotADirectory { path: PathBuf },
}

impl Error {
    /// True when the path was rejected before any disk mutation.
    pub fn is_path_error(&self) -> bool {
        match self {
            Self::Fs(e) => e.is_path_error(),
            Self::NotADirectory { .. } => true,
        }
    }
}
