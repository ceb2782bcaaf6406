//! Named collections of resolved setting values

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hardfox_catalog::{Catalog, Tier, ValidationError};
use hardfox_prefs::{PrefMap, PrefValue};
use serde::Serialize;

/// A named set of resolved values, ready to be applied.
///
/// Values are only changed through [`Profile::update_value`] and the reset
/// operations, which keep them consistent with the catalog. The `original`
/// snapshot is whatever the profile held when it was created or loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Preset the profile was seeded from; `None` for fully custom profiles.
    pub base_preset: Option<String>,
    settings: PrefMap,
    original: PrefMap,
}

/// A key whose profile value differs from the catalog default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingChange {
    pub key: String,
    pub default: PrefValue,
    pub value: PrefValue,
}

impl Profile {
    pub fn new(name: impl Into<String>, settings: PrefMap) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            created_at: None,
            modified_at: None,
            base_preset: None,
            original: settings.clone(),
            settings,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_preset(mut self, preset: impl Into<String>) -> Self {
        self.base_preset = Some(preset.into());
        self
    }

    pub fn settings(&self) -> &PrefMap {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.settings.get(key)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Set one key after checking it against the catalog.
    pub fn update_value(
        &mut self,
        catalog: &Catalog,
        key: &str,
        value: impl Into<PrefValue>,
    ) -> Result<(), ValidationError> {
        let value = value.into();
        catalog.validate(key, &value)?;
        tracing::debug!("{}: {} = {}", self.name, key, value.to_literal());
        self.settings.insert(key.to_string(), value);
        self.touch(Utc::now());
        Ok(())
    }

    /// Restore one key from the original snapshot. A key absent from the
    /// snapshot is removed. Returns whether anything changed.
    pub fn reset_value(&mut self, key: &str) -> bool {
        let before = self.settings.get(key).cloned();
        match self.original.get(key) {
            Some(value) => {
                self.settings.insert(key.to_string(), value.clone());
            }
            None => {
                self.settings.remove(key);
            }
        }
        let changed = before.as_ref() != self.settings.get(key);
        if changed {
            self.touch(Utc::now());
        }
        changed
    }

    /// Discard every change made since creation or load.
    pub fn reset_to_original(&mut self) {
        if self.settings != self.original {
            self.settings = self.original.clone();
            self.touch(Utc::now());
        }
    }

    /// Keys whose value differs from the original snapshot.
    pub fn modified_keys(&self) -> Vec<&str> {
        let changed = self
            .settings
            .iter()
            .filter(|(k, v)| self.original.get(*k) != Some(*v))
            .map(|(k, _)| k.as_str());
        let removed = self
            .original
            .keys()
            .filter(|k| !self.settings.contains_key(*k))
            .map(String::as_str);
        let mut keys: Vec<&str> = changed.chain(removed).collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_modified(&self) -> bool {
        self.settings != self.original
    }

    /// Every violation of the catalog, in key order. Empty means valid.
    pub fn validate(&self, catalog: &Catalog) -> Vec<ValidationError> {
        self.settings
            .iter()
            .filter_map(|(key, value)| catalog.validate(key, value).err())
            .collect()
    }

    pub fn diff_from_defaults(&self, catalog: &Catalog) -> Vec<SettingChange> {
        self.settings
            .iter()
            .filter_map(|(key, value)| {
                let setting = catalog.get(key)?;
                (setting.default != *value).then(|| SettingChange {
                    key: key.clone(),
                    default: setting.default.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Split the resolved values by the tier of their catalog entry. Keys the
    /// catalog does not know are left out.
    pub fn by_tier(&self, catalog: &Catalog) -> BTreeMap<Tier, PrefMap> {
        let mut tiers: BTreeMap<Tier, PrefMap> = BTreeMap::new();
        for (key, value) in &self.settings {
            if let Some(setting) = catalog.get(key) {
                tiers
                    .entry(setting.tier)
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
        }
        tiers
    }

    /// Record a modification at `now`, setting the creation time if unset.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.modified_at = Some(now);
    }
}
