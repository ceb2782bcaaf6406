//! Catalog document schema
//!
//! The on-disk form of a catalog. Everything here is loosely typed and
//! optional; [`Catalog::from_document`](crate::Catalog::from_document) turns
//! it into validated [`Setting`](crate::Setting)s.
//!
//! # Example TOML
//!
//! ```toml
//! version = "2025.1"
//!
//! [[settings]]
//! key = "network.trr.mode"
//! name = "DNS over HTTPS"
//! category = "security"
//! tier = "enforced"
//! kind = "dropdown"
//! default = 0
//! options = [0, 2, 3, 5]
//! breakage = 1
//! intent_tags = ["banking"]
//! harden = { value = 2, min_level = "strong" }
//!
//! [[presets]]
//! id = "office"
//! name = "Office"
//! use_cases = ["work", "banking"]
//! privacy_level = "moderate"
//!
//! [presets.values]
//! "network.trr.mode" = 2
//!
//! [[overrides]]
//! tag = "banking"
//! key = "privacy.resistFingerprinting"
//! value = true
//! ```

use std::collections::BTreeMap;

use hardfox_prefs::PrefValue;
use serde::{Deserialize, Serialize};

use crate::setting::{PrivacyLevel, Tier};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub settings: Vec<SettingDefinition>,
    #[serde(default)]
    pub presets: Vec<PresetDefinition>,
    #[serde(default)]
    pub overrides: Vec<OverrideDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KindName {
    Toggle,
    Slider,
    Dropdown,
    FreeInput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingDefinition {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub tier: Tier,
    pub kind: KindName,
    pub default: PrefValue,
    #[serde(default)]
    pub breakage: u8,
    #[serde(default)]
    pub intent_tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub min: Option<PrefValue>,
    #[serde(default)]
    pub max: Option<PrefValue>,
    #[serde(default)]
    pub step: Option<PrefValue>,
    #[serde(default)]
    pub options: Vec<PrefValue>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub harden: Option<HardenDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardenDefinition {
    pub value: PrefValue,
    pub min_level: PrivacyLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresetDefinition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_cases: Vec<String>,
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub values: BTreeMap<String, PrefValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverrideDefinition {
    pub tag: String,
    pub key: String,
    pub value: PrefValue,
}
