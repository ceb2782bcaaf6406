//! Single-flight guard for directory-scoped operations
//!
//! Writers that touch several files of one directory (backup, merge,
//! replace) hold a [`DirectoryGuard`] for the duration so that two callers
//! in the same process cannot interleave their sequences.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::{Error, Result};

static IN_FLIGHT: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(Default::default);

/// Marks a directory as busy until dropped.
#[derive(Debug)]
pub struct DirectoryGuard {
    dir: PathBuf,
}

impl DirectoryGuard {
    /// Claim `dir`, failing with [`Error::Busy`] if it is already claimed.
    ///
    /// The path is canonicalized first when possible so that different
    /// spellings of one directory share a slot.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let dir = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let mut in_flight = IN_FLIGHT.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(dir.clone()) {
            return Err(Error::Busy { path: dir });
        }
        tracing::debug!("Claimed {}", dir.display());
        Ok(Self { dir })
    }

    /// The claimed directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for DirectoryGuard {
    fn drop(&mut self) {
        let mut in_flight = IN_FLIGHT.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(&self.dir);
    }
}
