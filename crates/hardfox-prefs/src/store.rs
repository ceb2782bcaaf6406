//! Backed-up atomic reads and writes of preference files
//!
//! Every path handed to a [`PrefStore`] is confined to its root directory.
//! A write takes one snapshot of the existing file, derives both the backup
//! and the merged content from it, then atomically replaces the target.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use hardfox_fs::{NormalizedPath, RobustnessConfig, checksum, io, resolve_within};

use crate::codec::{self, CallForm, ParseWarning, ParsedPrefs};
use crate::value::PrefMap;
use crate::{Error, Result};

/// Marker files whose presence identifies a browser profile directory.
pub const PROFILE_MARKERS: [&str; 2] = ["prefs.js", "times.json"];

const BACKUP_INFIX: &str = ".backup_";
const BACKUP_TIME_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// How managed values combine with what is already in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overlay managed keys, keep every other existing key.
    Merge,
    /// The file holds exactly the managed keys afterwards.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Timestamped backups retained per file; 0 keeps all of them.
    pub keep_backups: usize,
    pub robustness: RobustnessConfig,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            keep_backups: 5,
            robustness: RobustnessConfig::default(),
        }
    }
}

/// What a single [`PrefStore::write`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// Managed keys written.
    pub written: usize,
    /// Pre-existing unmanaged keys kept by a merge.
    pub preserved: usize,
    /// False when the file already held exactly the computed content.
    pub changed: bool,
    pub backup: Option<PathBuf>,
    pub checksum: String,
    /// Lines of the previous content that were skipped while merging.
    pub warnings: Vec<ParseWarning>,
}

/// Reads and writes preference files under one profile directory.
#[derive(Debug, Clone)]
pub struct PrefStore {
    root: PathBuf,
    options: StoreOptions,
}

impl PrefStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let root = root.as_ref();
        let canonical = dunce::canonicalize(root).map_err(|e| hardfox_fs::Error::io(root, e))?;
        if !canonical.is_dir() {
            return Err(Error::NotADirectory { path: canonical });
        }
        Ok(Self {
            root: canonical,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Resolve `path` to a file confined to the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(resolve_within(&self.root, path)?)
    }

    /// Whether the root contains one of the [`PROFILE_MARKERS`].
    pub fn validate_profile_dir(&self) -> bool {
        PROFILE_MARKERS
            .iter()
            .any(|marker| self.root.join(marker).is_file())
    }

    /// Read and parse a file. A missing file reads as an empty mapping.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<ParsedPrefs> {
        let target = self.resolve(path)?;
        match io::read_bytes_if_exists(&target)? {
            Some(bytes) => Ok(codec::parse(&codec::decode(&bytes))),
            None => {
                tracing::debug!("{} does not exist, reading as empty", target.display());
                Ok(ParsedPrefs::default())
            }
        }
    }

    /// Write `managed` into `path` using `mode` and `form`.
    ///
    /// Path problems are reported before anything on disk changes. If the
    /// computed content equals the current content, nothing is written and
    /// no backup is taken.
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        managed: &PrefMap,
        mode: WriteMode,
        form: CallForm,
    ) -> Result<WriteOutcome> {
        let target = self.resolve(path)?;
        let snapshot = io::read_bytes_if_exists(&target)?;

        let (content, preserved, warnings) = match (&snapshot, mode) {
            (Some(bytes), WriteMode::Merge) => {
                let existing = codec::parse(&codec::decode(bytes));
                let preserved = existing
                    .prefs
                    .keys()
                    .filter(|k| !managed.contains_key(*k))
                    .count();
                let mut merged = existing.prefs;
                merged.extend(managed.iter().map(|(k, v)| (k.clone(), v.clone())));
                (codec::serialize(&merged, form), preserved, existing.warnings)
            }
            _ => (codec::serialize(managed, form), 0, Vec::new()),
        };

        let checksum = checksum::compute_checksum(content.as_bytes());
        let mut outcome = WriteOutcome {
            path: target.clone(),
            written: managed.len(),
            preserved,
            changed: false,
            backup: None,
            checksum,
            warnings,
        };

        if snapshot.as_deref() == Some(content.as_bytes()) {
            tracing::debug!("{} already up to date", target.display());
            return Ok(outcome);
        }

        if let Some(bytes) = &snapshot {
            outcome.backup = Some(self.create_backup(&target, bytes)?);
        }

        io::write_atomic(
            &NormalizedPath::new(&target),
            content.as_bytes(),
            self.options.robustness,
        )?;
        outcome.changed = true;

        if outcome.backup.is_some() {
            self.rotate_backups(&target);
        }

        tracing::info!(
            "Wrote {} ({} managed, {} preserved, {:?})",
            target.display(),
            outcome.written,
            outcome.preserved,
            mode
        );
        Ok(outcome)
    }

    /// Backups of `path`, oldest first.
    pub fn backups(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let target = self.resolve(path)?;
        list_backups(&target)
    }

    fn create_backup(&self, target: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format(BACKUP_TIME_FORMAT).to_string();
        let base = format!("{}{}{}", file_name(target), BACKUP_INFIX, stamp);

        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}-{attempt}")
            };
            let backup = target.with_file_name(name);
            match OpenOptions::new().write(true).create_new(true).open(&backup) {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .map_err(|e| hardfox_fs::Error::io(&backup, e))?;
                    if self.options.robustness.enable_fsync {
                        file.sync_all()
                            .map_err(|e| hardfox_fs::Error::io(&backup, e))?;
                    }
                    tracing::info!("Backed up {} to {}", target.display(), backup.display());
                    return Ok(backup);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(hardfox_fs::Error::io(&backup, e).into()),
            }
        }
    }

    fn rotate_backups(&self, target: &Path) {
        let keep = self.options.keep_backups;
        if keep == 0 {
            return;
        }
        let backups = match list_backups(target) {
            Ok(backups) => backups,
            Err(e) => {
                tracing::warn!("Could not list backups of {}: {}", target.display(), e);
                return;
            }
        };
        let excess = backups.len().saturating_sub(keep);
        for old in &backups[..excess] {
            match fs::remove_file(old) {
                Ok(()) => tracing::debug!("Removed old backup {}", old.display()),
                Err(e) => tracing::warn!("Could not remove backup {}: {}", old.display(), e),
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn list_backups(target: &Path) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}{}", file_name(target), BACKUP_INFIX);
    let Some(dir) = target.parent() else {
        return Ok(Vec::new());
    };
    let entries = fs::read_dir(dir).map_err(|e| hardfox_fs::Error::io(dir, e))?;

    let mut found: Vec<((String, u64), PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = backup_sort_key(name.strip_prefix(&prefix)?);
            Some((key, entry.path()))
        })
        .collect();
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Orders `<stamp>` before `<stamp>-1` before `<stamp>-2`.
fn backup_sort_key(suffix: &str) -> (String, u64) {
    match suffix.split_once('-') {
        Some((stamp, n)) => (stamp.to_string(), n.parse().unwrap_or(u64::MAX)),
        None => (suffix.to_string(), 0),
    }
}
