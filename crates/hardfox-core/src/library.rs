//! On-disk collection of saved profiles
//!
//! Each profile is one JSON document in the library directory, named after
//! a sanitized form of the profile name.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hardfox_catalog::Catalog;
use hardfox_fs::{ConfigStore, NormalizedPath, RobustnessConfig};
use serde::Serialize;

use crate::document::{self, ProfileDocument};
use crate::profile::Profile;
use crate::{Error, Result};

const EXTENSION: &str = "json";
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Listing entry for a saved profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub file: PathBuf,
    pub base: Option<String>,
    pub modified: Option<DateTime<Utc>>,
    pub settings: usize,
}

/// Saved profiles under one directory.
#[derive(Debug)]
pub struct ProfileLibrary {
    dir: PathBuf,
    catalog: Arc<Catalog>,
    store: ConfigStore,
}

impl ProfileLibrary {
    /// The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>, catalog: Arc<Catalog>) -> Self {
        Self {
            dir: dir.into(),
            catalog,
            store: ConfigStore::new(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.store = ConfigStore::with_robustness(robustness);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Document path for a profile name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.{EXTENSION}", sanitize_name(name)?)))
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Save `profile`, stamping it. Overwriting an existing document keeps
    /// that document's creation time.
    pub fn save(&self, profile: &mut Profile) -> Result<PathBuf> {
        let path = self.path_for(&profile.name)?;
        let target = NormalizedPath::new(&path);
        if target.exists() {
            match self.store.load::<ProfileDocument>(&target) {
                Ok(previous) => {
                    if let Some(created) = previous.created {
                        profile.created_at = Some(created);
                    }
                }
                Err(e) => tracing::warn!("Overwriting unreadable {}: {}", path.display(), e),
            }
        }
        profile.touch(Utc::now());

        self.store
            .save(&target, &ProfileDocument::from_profile(profile))?;
        tracing::info!("Saved profile '{}' to {}", profile.name, path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Profile> {
        let path = self.existing(name)?;
        document::read_file(&path, &self.catalog)
    }

    /// Saved profiles, most recently modified first. Unreadable documents are
    /// skipped.
    pub fn list(&self) -> Result<Vec<ProfileSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(hardfox_fs::Error::io(&self.dir, e).into()),
        };

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) || !path.is_file() {
                continue;
            }
            match self.store.load::<ProfileDocument>(&NormalizedPath::new(&path)) {
                Ok(doc) => summaries.push(ProfileSummary {
                    name: doc.name,
                    file: path,
                    base: doc.base,
                    modified: doc.modified,
                    settings: doc.settings.len(),
                }),
                Err(e) => tracing::warn!("Skipping unreadable profile {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(summaries)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing(name)?;
        fs::remove_file(&path).map_err(|e| hardfox_fs::Error::io(&path, e))?;
        tracing::info!("Deleted profile '{}'", name);
        Ok(())
    }

    /// Copy a saved profile under a new name with fresh timestamps.
    pub fn duplicate(&self, name: &str, new_name: &str) -> Result<Profile> {
        if self.exists(new_name)? {
            return Err(Error::InvalidProfileName {
                name: new_name.to_string(),
                reason: "a profile with this name already exists".to_string(),
            });
        }
        let source = self.load(name)?;
        let mut copy = Profile::new(new_name, source.settings().clone())
            .with_description(source.description.clone())
            .with_tags(source.tags.clone());
        copy.base_preset = source.base_preset.clone();
        self.save(&mut copy)?;
        Ok(copy)
    }

    /// Write a saved profile to an arbitrary path.
    pub fn export(&self, name: &str, dest: &Path) -> Result<()> {
        let profile = self.load(name)?;
        document::write_file(dest, &profile, RobustnessConfig::default())
    }

    /// Validate a document from an arbitrary path and add it to the library.
    pub fn import(&self, source: &Path) -> Result<Profile> {
        let mut profile = document::read_file(source, &self.catalog)?;
        self.save(&mut profile)?;
        Ok(profile)
    }

    fn existing(&self, name: &str) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::ProfileNotFound {
                name: name.to_string(),
            })
        }
    }
}

/// File stem for a profile name: lowercase, with whitespace, control and
/// reserved characters replaced by `_`.
pub fn sanitize_name(name: &str) -> Result<String> {
    let invalid = |reason: &str| Error::InvalidProfileName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name is empty"));
    }
    if trimmed.contains("..") {
        return Err(invalid("name must not contain '..'"));
    }

    let stem: String = trimmed
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || RESERVED.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    if stem.starts_with('.') {
        return Err(invalid("name must not start with '.'"));
    }
    Ok(stem)
}
