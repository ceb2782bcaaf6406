//! The immutable settings catalog

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use hardfox_fs::{ConfigStore, NormalizedPath};
use hardfox_prefs::{PrefMap, PrefValue};

use crate::preset::{OverrideRule, Preset};
use crate::schema::{CatalogDocument, KindName, OverrideDefinition, PresetDefinition, SettingDefinition};
use crate::setting::{Hardening, Setting, SettingKind, SliderRange, Tier};
use crate::{Error, Result, ValidationError};

const BUILTIN: &str = include_str!("../data/catalog.toml");

/// Every managed setting, preset and override rule, validated as a whole.
///
/// Settings keep their declaration order; presets too, which matters for
/// breaking score ties.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    settings: Vec<Setting>,
    index: HashMap<String, usize>,
    presets: Vec<Preset>,
    overrides: Vec<OverrideRule>,
}

impl Catalog {
    /// The catalog shipped with hardfox.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: CatalogDocument =
            toml::from_str(text).map_err(|e| Error::invalid(e.to_string()))?;
        Self::from_document(document)
    }

    /// Load a catalog document from disk. The format follows the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let document: CatalogDocument = ConfigStore::new()
            .load(&NormalizedPath::new(path))
            .map_err(|e| match e {
                hardfox_fs::Error::ConfigParse { path, message, .. } => {
                    Error::CatalogParse { path, message }
                }
                other => Error::Fs(other),
            })?;
        let catalog = Self::from_document(document)?;
        tracing::info!(
            "Loaded catalog {} from {} ({} settings)",
            catalog.version,
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Validate a parsed document and build the catalog from it.
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut settings = Vec::with_capacity(document.settings.len());
        let mut index = HashMap::with_capacity(document.settings.len());
        for definition in document.settings {
            let setting = build_setting(definition)?;
            if index.insert(setting.key.clone(), settings.len()).is_some() {
                return Err(Error::invalid(format!("duplicate setting '{}'", setting.key)));
            }
            settings.push(setting);
        }

        let mut catalog = Self {
            version: document.version,
            settings,
            index,
            presets: Vec::new(),
            overrides: Vec::new(),
        };

        let mut preset_ids = HashSet::new();
        for definition in document.presets {
            let preset = catalog.build_preset(definition)?;
            if !preset_ids.insert(preset.id.clone()) {
                return Err(Error::invalid(format!("duplicate preset '{}'", preset.id)));
            }
            catalog.presets.push(preset);
        }

        for definition in document.overrides {
            let rule = catalog.build_override(definition)?;
            catalog.overrides.push(rule);
        }

        tracing::debug!(
            "Catalog {} ready: {} settings, {} presets, {} overrides",
            catalog.version,
            catalog.settings.len(),
            catalog.presets.len(),
            catalog.overrides.len()
        );
        Ok(catalog)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// All settings in declaration order.
    pub fn all(&self) -> &[Setting] {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.index.get(key).map(|&i| &self.settings[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Setting> + 'a {
        self.settings.iter().filter(move |s| s.category == category)
    }

    pub fn by_tier(&self, tier: Tier) -> impl Iterator<Item = &Setting> + '_ {
        self.settings.iter().filter(move |s| s.tier == tier)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.settings
            .iter()
            .map(|s| s.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn preset(&self, id: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PresetNotFound { id: id.to_string() })
    }

    pub fn overrides(&self) -> &[OverrideRule] {
        &self.overrides
    }

    /// Check `value` against the entry for `key`.
    pub fn validate(&self, key: &str, value: &PrefValue) -> std::result::Result<(), ValidationError> {
        self.get(key)
            .ok_or_else(|| ValidationError::UnknownKey {
                key: key.to_string(),
            })?
            .check(value)
    }

    /// Every setting at its default value.
    pub fn defaults(&self) -> PrefMap {
        self.settings
            .iter()
            .map(|s| (s.key.clone(), s.default.clone()))
            .collect()
    }

    fn build_preset(&self, definition: PresetDefinition) -> Result<Preset> {
        let id = definition.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::invalid("preset with an empty id"));
        }
        for (key, value) in &definition.values {
            self.validate(key, value)
                .map_err(|e| Error::invalid(format!("preset '{id}': {e}")))?;
        }
        Ok(Preset {
            name: definition.name.unwrap_or_else(|| id.clone()),
            id,
            description: definition.description,
            use_cases: normalize_tags(definition.use_cases),
            privacy_level: definition.privacy_level,
            values: definition.values.into_iter().collect(),
        })
    }

    fn build_override(&self, definition: OverrideDefinition) -> Result<OverrideRule> {
        let tag = definition.tag.trim().to_lowercase();
        self.validate(&definition.key, &definition.value)
            .map_err(|e| Error::invalid(format!("override for tag '{tag}': {e}")))?;
        Ok(OverrideRule {
            tag,
            key: definition.key,
            value: definition.value,
        })
    }
}

fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn build_setting(definition: SettingDefinition) -> Result<Setting> {
    let key = definition.key.trim().to_string();
    if key.is_empty() {
        return Err(Error::invalid("setting with an empty key"));
    }
    let invalid = |message: String| Error::invalid(format!("setting '{key}': {message}"));

    if definition.breakage > 10 {
        return Err(invalid(format!(
            "breakage {} exceeds 10",
            definition.breakage
        )));
    }

    let kind = match definition.kind {
        KindName::Toggle => SettingKind::Toggle,
        KindName::FreeInput => SettingKind::FreeInput,
        KindName::Slider => SettingKind::Slider(
            slider_range(definition.min, definition.max, definition.step).map_err(&invalid)?,
        ),
        KindName::Dropdown => {
            if definition.options.is_empty() {
                return Err(invalid("dropdown without options".to_string()));
            }
            if !definition.labels.is_empty() && definition.labels.len() != definition.options.len() {
                return Err(invalid(format!(
                    "{} labels for {} options",
                    definition.labels.len(),
                    definition.options.len()
                )));
            }
            SettingKind::Dropdown {
                options: definition.options,
                labels: definition.labels,
            }
        }
    };

    let setting = Setting {
        name: definition.name.unwrap_or_else(|| key.clone()),
        description: definition.description,
        warning: definition.warning,
        category: definition.category.trim().to_lowercase(),
        subcategory: definition.subcategory,
        tier: definition.tier,
        kind,
        default: definition.default,
        breakage: definition.breakage,
        intent_tags: normalize_tags(definition.intent_tags),
        harden: definition.harden.map(|h| Hardening {
            value: h.value,
            min_level: h.min_level,
        }),
        key: key.clone(),
    };

    setting
        .check(&setting.default)
        .map_err(|e| invalid(format!("invalid default: {e}")))?;
    if let Some(harden) = &setting.harden {
        setting
            .check(&harden.value)
            .map_err(|e| invalid(format!("invalid hardened value: {e}")))?;
    }
    Ok(setting)
}

fn slider_range(
    min: Option<PrefValue>,
    max: Option<PrefValue>,
    step: Option<PrefValue>,
) -> std::result::Result<SliderRange, String> {
    let (Some(min), Some(max), Some(step)) = (min, max, step) else {
        return Err("slider needs min, max and step".to_string());
    };
    match (min, max, step) {
        (PrefValue::Int(min), PrefValue::Int(max), PrefValue::Int(step)) => {
            if min >= max {
                return Err(format!("slider min {min} is not below max {max}"));
            }
            if step <= 0 {
                return Err(format!("slider step {step} is not positive"));
            }
            Ok(SliderRange::Int { min, max, step })
        }
        (PrefValue::Float(min), PrefValue::Float(max), PrefValue::Float(step)) => {
            if min.is_nan() || max.is_nan() || min >= max {
                return Err(format!("slider min {min} is not below max {max}"));
            }
            if step.is_nan() || step <= 0.0 {
                return Err(format!("slider step {step} is not positive"));
            }
            Ok(SliderRange::Float { min, max, step })
        }
        _ => Err("slider bounds must all be integers or all be floats".to_string()),
    }
}
