//! Application configuration
//!
//! Loaded from `config.toml` in the platform config directory:
//! - Linux: `~/.config/hardfox/`
//! - macOS: `~/Library/Application Support/hardfox/`
//! - Windows: `%APPDATA%\hardfox\`
//!
//! A missing file means defaults. Every field is optional.
//!
//! ```toml
//! profiles_dir = "/home/me/hardfox-profiles"
//! catalog = "/home/me/catalog.toml"
//! require_profile_markers = true
//!
//! [backups]
//! keep = 5
//!
//! [write]
//! lock_timeout_ms = 5000
//! fsync = true
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hardfox_catalog::Catalog;
use hardfox_fs::{ConfigStore, NormalizedPath, RobustnessConfig};
use hardfox_prefs::StoreOptions;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::apply::ApplyOptions;

const APP_DIR: &str = "hardfox";

/// Backup retention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Backups kept per file; 0 keeps every backup
    pub keep: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self { keep: 5 }
    }
}

/// Write robustness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    pub lock_timeout_ms: u64,
    pub fsync: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5000,
            fsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardfoxConfig {
    /// Where saved profiles live; platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles_dir: Option<PathBuf>,
    /// External catalog replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    pub require_profile_markers: bool,
    pub backups: BackupConfig,
    pub write: WriteConfig,
}

impl Default for HardfoxConfig {
    fn default() -> Self {
        Self {
            profiles_dir: None,
            catalog: None,
            require_profile_markers: true,
            backups: BackupConfig::default(),
            write: WriteConfig::default(),
        }
    }
}

impl HardfoxConfig {
    /// `<config_dir>/hardfox/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };
        let config: Self = ConfigStore::new().load_or_default(&NormalizedPath::new(&path))?;
        tracing::debug!("Configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.profiles_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR).join("profiles"))
                .unwrap_or_else(|| PathBuf::from("profiles"))
        })
    }

    pub fn robustness(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.write.lock_timeout_ms),
            enable_fsync: self.write.fsync,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            keep_backups: self.backups.keep,
            robustness: self.robustness(),
        }
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            store: self.store_options(),
            require_profile_markers: self.require_profile_markers,
        }
    }

    /// The configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<Arc<Catalog>> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        Ok(Arc::new(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: HardfoxConfig = toml::from_str("[backups]\nkeep = 2\n").unwrap();
        assert_eq!(config.backups.keep, 2);
        assert_eq!(config.write, WriteConfig::default());
        assert!(config.require_profile_markers);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HardfoxConfig::load(Some(&dir.path().join("config.toml"))).unwrap();
        assert_eq!(config, HardfoxConfig::default());
    }

    #[test]
    fn options_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "require_profile_markers = false\n[write]\nlock_timeout_ms = 100\nfsync = false\n",
        )
        .unwrap();

        let options = HardfoxConfig::load(Some(&path)).unwrap().apply_options();
        assert!(!options.require_profile_markers);
        assert_eq!(options.store.robustness.lock_timeout, Duration::from_millis(100));
        assert!(!options.store.robustness.enable_fsync);
        assert_eq!(options.store.keep_backups, 5);
    }

    #[test]
    fn explicit_profiles_dir_is_used() {
        let config = HardfoxConfig {
            profiles_dir: Some(PathBuf::from("/tmp/p")),
            ..Default::default()
        };
        assert_eq!(config.profiles_dir(), PathBuf::from("/tmp/p"));
    }
}
