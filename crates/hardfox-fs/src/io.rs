//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Tuning knobs for [`write_atomic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up.
    pub lock_timeout: Duration,
    /// Flush the temp file to disk before the rename.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Acquires an advisory lock on `<file>.lock`, writes a temp file in the
/// same directory and renames it over the target. On any failure the temp
/// file is removed and the target keeps its previous content. The lock file
/// is deleted before the lock is released.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_path = sibling(&native_path, |name| format!("{name}.lock"));
    let lock_file = lock_sibling(&lock_path, &native_path, config.lock_timeout)?;

    let temp_path = sibling(&native_path, |name| {
        format!(
            ".{}.{}.{}.tmp",
            name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        )
    });

    let result = write_then_rename(&temp_path, &native_path, content, config.enable_fsync);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    // Removed while still held; a waiter that then locks the unlinked file retries.
    if let Err(e) = fs::remove_file(&lock_path) {
        tracing::debug!("Could not remove {}: {}", lock_path.display(), e);
    }
    if FileExt::unlock(&lock_file).is_err() {
        tracing::warn!("Failed to release lock on {}", lock_path.display());
    }

    result
}

fn write_then_rename(temp_path: &Path, target: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    drop(temp_file);

    fs::rename(temp_path, target).map_err(|e| Error::io(target, e))?;
    tracing::debug!("Atomically replaced {}", target.display());
    Ok(())
}

/// Open and lock `<file>.lock`. The previous holder deletes the lock file on
/// release, so a lock taken on an unlinked file is dropped and retried on
/// the file now at `lock_path`.
fn lock_sibling(lock_path: &Path, target: &Path, timeout: Duration) -> Result<File> {
    const ATTEMPTS: usize = 8;

    for _ in 0..ATTEMPTS {
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| Error::io(lock_path, e))?;
        acquire_lock(&lock_file, target, timeout)?;
        if is_current(&lock_file, lock_path) {
            return Ok(lock_file);
        }
        tracing::debug!("{} was replaced while waiting, retrying", lock_path.display());
    }
    Err(Error::LockFailed {
        path: target.to_path_buf(),
    })
}

#[cfg(unix)]
fn is_current(file: &File, lock_path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(lock_path)) {
        (Ok(held), Ok(on_disk)) => held.dev() == on_disk.dev() && held.ino() == on_disk.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_current(_file: &File, lock_path: &Path) -> bool {
    lock_path.exists()
}

fn acquire_lock(file: &File, target: &Path, timeout: Duration) -> Result<()> {
    let mut policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(timeout),
        ..ExponentialBackoff::default()
    };

    loop {
        match FileExt::try_lock_exclusive(file) {
            Ok(()) => return Ok(()),
            Err(_) => match policy.next_backoff() {
                Some(wait) => std::thread::sleep(wait),
                None => {
                    return Err(Error::LockFailed {
                        path: target.to_path_buf(),
                    });
                }
            },
        }
    }
}

fn sibling(path: &Path, name: impl FnOnce(&str) -> String) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(name(&file_name))
}

/// Read raw bytes, returning `None` when the file does not exist.
pub fn read_bytes_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically with default robustness settings.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // A directory in place of the target makes the rename fail.
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner"), "x").unwrap();

        let result = write_atomic(
            &NormalizedPath::new(&target),
            b"data",
            RobustnessConfig::default(),
        );
        assert!(result.is_err());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn lock_file_is_removed_after_write() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("prefs.js");

        write_atomic(
            &NormalizedPath::new(&target),
            b"user_pref(\"a\", 1);\n",
            RobustnessConfig::default(),
        )
        .unwrap();

        assert!(target.is_file());
        assert!(!dir.path().join("prefs.js.lock").exists());
    }

    #[test]
    fn read_bytes_if_exists_returns_none_for_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.js");
        assert!(read_bytes_if_exists(&missing).unwrap().is_none());
    }
}
