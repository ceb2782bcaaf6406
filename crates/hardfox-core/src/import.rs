//! Building a profile from the values already set in a browser profile

use std::path::Path;

use hardfox_catalog::{Catalog, Tier};
use hardfox_prefs::{ParseWarning, PrefMap, PrefStore, PrefValue, StoreOptions};
use serde::Serialize;

use crate::Result;
use crate::profile::Profile;

/// A managed key found on disk whose value the catalog rejects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPref {
    pub file: &'static str,
    pub key: String,
    pub value: PrefValue,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub profile: Profile,
    pub skipped: Vec<SkippedPref>,
    /// Keys outside the catalog, which are ignored.
    pub unmanaged: usize,
    pub warnings: Vec<(&'static str, ParseWarning)>,
}

/// Read `prefs.js` then `user.js` from `dir` and keep the catalog keys whose
/// values validate. Values in `user.js` win, as they do in the browser.
pub fn import_profile(catalog: &Catalog, dir: &Path) -> Result<ImportReport> {
    let store = PrefStore::new(dir, StoreOptions::default())?;
    let mut settings = PrefMap::new();
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();
    let mut unmanaged = 0;

    for tier in Tier::ALL {
        let file = tier.file_name();
        let parsed = store.read(file)?;
        warnings.extend(parsed.warnings.into_iter().map(|w| (file, w)));

        for (key, value) in parsed.prefs {
            if !catalog.contains(&key) {
                unmanaged += 1;
                continue;
            }
            match catalog.validate(&key, &value) {
                Ok(()) => {
                    settings.insert(key, value);
                }
                Err(e) => skipped.push(SkippedPref {
                    file,
                    key,
                    value,
                    reason: e.to_string(),
                }),
            }
        }
    }

    let dir_name = store
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| store.root().display().to_string());
    let profile = Profile::new(format!("Imported from {dir_name}"), settings)
        .with_description(format!("Imported from {}", store.root().display()));

    tracing::info!(
        "Imported {} settings from {} ({} skipped, {} unmanaged)",
        profile.len(),
        store.root().display(),
        skipped.len(),
        unmanaged
    );
    Ok(ImportReport {
        profile,
        skipped,
        unmanaged,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CATALOG: &str = r#"
version = "test"

[[settings]]
key = "geo.enabled"
category = "security"
tier = "baseline"
kind = "toggle"
default = true

[[settings]]
key = "network.trr.mode"
category = "security"
tier = "enforced"
kind = "dropdown"
default = 0
options = [0, 2, 3, 5]
"#;

    #[test]
    fn user_js_wins_and_bad_values_are_skipped() {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("prefs.js"),
            "user_pref(\"geo.enabled\", false);\nuser_pref(\"browser.other\", 1);\n# comment\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("user.js"),
            "user_pref(\"geo.enabled\", true);\nuser_pref(\"network.trr.mode\", 4);\n",
        )
        .unwrap();

        let report = import_profile(&catalog, dir.path()).unwrap();
        assert_eq!(report.profile.get("geo.enabled"), Some(&PrefValue::Bool(true)));
        assert_eq!(report.profile.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].key, "network.trr.mode");
        assert_eq!(report.unmanaged, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.profile.name.starts_with("Imported from "));
        assert!(report.profile.base_preset.is_none());
    }

    #[test]
    fn empty_directory_imports_nothing() {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let report = import_profile(&catalog, dir.path()).unwrap();
        assert!(report.profile.is_empty());
        assert!(report.warnings.is_empty());
    }
}
