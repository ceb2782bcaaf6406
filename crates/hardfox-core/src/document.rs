//! Profile export/import documents
//!
//! ```json
//! {
//!   "name": "Banking - Privacy Pro",
//!   "description": "...",
//!   "tags": ["banking"],
//!   "created": "2025-01-01T12:00:00Z",
//!   "modified": "2025-01-01T12:00:00Z",
//!   "base": "office",
//!   "version": "1.0",
//!   "settings": { "privacy.resistFingerprinting": true }
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use hardfox_catalog::Catalog;
use hardfox_fs::{NormalizedPath, RobustnessConfig, io};
use hardfox_prefs::PrefMap;
use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::{Error, Result};

/// Document format version written by this crate.
pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub settings: PrefMap,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

impl ProfileDocument {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            tags: profile.tags.clone(),
            created: profile.created_at,
            modified: profile.modified_at,
            base: profile.base_preset.clone(),
            version: DOCUMENT_VERSION.to_string(),
            settings: profile.settings().clone(),
        }
    }

    /// Turn the document into a profile, rejecting it when the version is
    /// not a 1.x format or any value fails the catalog.
    pub fn into_profile(self, catalog: &Catalog) -> Result<Profile> {
        let major = self.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(Error::UnsupportedVersion {
                version: self.version,
            });
        }

        let mut profile = Profile::new(self.name, self.settings)
            .with_description(self.description)
            .with_tags(self.tags);
        profile.base_preset = self.base;
        profile.created_at = self.created;
        profile.modified_at = self.modified;

        let violations = profile.validate(catalog);
        if !violations.is_empty() {
            return Err(Error::InvalidProfile {
                name: profile.name,
                violations,
            });
        }
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Serialize `profile` as a document, stamping it first if it never was.
pub fn to_json(profile: &Profile) -> Result<String> {
    let mut document = ProfileDocument::from_profile(profile);
    let now = Utc::now();
    document.created.get_or_insert(now);
    document.modified.get_or_insert(now);
    document.to_json()
}

/// Parse and validate a document from JSON text.
pub fn from_json(text: &str, catalog: &Catalog) -> Result<Profile> {
    let document: ProfileDocument = serde_json::from_str(text)?;
    document.into_profile(catalog)
}

/// Read a profile document from any path.
pub fn read_file(path: &Path, catalog: &Catalog) -> Result<Profile> {
    let text = io::read_text(&NormalizedPath::new(path))?;
    let document: ProfileDocument =
        serde_json::from_str(&text).map_err(|e| Error::InvalidDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    document.into_profile(catalog)
}

/// Atomically write `profile` as a document to any path.
pub fn write_file(path: &Path, profile: &Profile, robustness: RobustnessConfig) -> Result<()> {
    let json = to_json(profile)?;
    io::write_atomic(&NormalizedPath::new(path), json.as_bytes(), robustness)?;
    tracing::info!("Exported '{}' to {}", profile.name, path.display());
    Ok(())
}
