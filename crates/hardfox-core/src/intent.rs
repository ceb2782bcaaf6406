//! Intent analysis
//!
//! Maps declared use cases, a privacy level and a breakage tolerance onto a
//! complete [`Profile`]. Resolution runs in three passes over the catalog:
//!
//! 1. seed every key from the best-scoring preset (or the catalog default),
//! 2. swap in the hardened value where the intent asks for it and the
//!    tolerance admits the setting's breakage,
//! 3. apply override rules for matching use cases, last rule winning.
//!
//! Nothing here reads the clock or any other ambient state, so equal inputs
//! always produce equal profiles.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use hardfox_catalog::{Catalog, Preset, PrivacyLevel, Setting};
use hardfox_prefs::{PrefMap, PrefValue};
use serde::Serialize;

use crate::profile::Profile;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentInput {
    use_cases: BTreeSet<String>,
    /// First use case as given, used for naming.
    primary: Option<String>,
    privacy: PrivacyLevel,
    breakage_tolerance: u8,
}

impl IntentInput {
    /// Tags are trimmed and lowercased; empty ones are dropped. A tolerance
    /// above 100 is clamped.
    pub fn new(
        use_cases: impl IntoIterator<Item = impl AsRef<str>>,
        privacy: PrivacyLevel,
        breakage_tolerance: u8,
    ) -> Self {
        let tags: Vec<String> = use_cases
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            primary: tags.first().cloned(),
            use_cases: tags.into_iter().collect(),
            privacy,
            breakage_tolerance: breakage_tolerance.min(100),
        }
    }

    pub fn use_cases(&self) -> &BTreeSet<String> {
        &self.use_cases
    }

    pub fn privacy(&self) -> PrivacyLevel {
        self.privacy
    }

    pub fn breakage_tolerance(&self) -> u8 {
        self.breakage_tolerance
    }

    /// Whether a setting with `breakage` fits within the tolerance.
    pub fn tolerates(&self, breakage: u8) -> bool {
        u16::from(breakage) * 10 <= u16::from(self.breakage_tolerance)
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "detail", rename_all = "lowercase")]
pub enum Provenance {
    Default,
    Preset(String),
    Hardened,
    Override(String),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Preset(id) => write!(f, "preset {id}"),
            Self::Hardened => f.write_str("hardened"),
            Self::Override(tag) => write!(f, "override for '{tag}'"),
        }
    }
}

/// One resolved key with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub key: String,
    pub value: PrefValue,
    pub provenance: Provenance,
}

/// The rule engine. Holds only the shared, read-only catalog.
#[derive(Debug, Clone)]
pub struct IntentAnalyzer {
    catalog: Arc<Catalog>,
}

impl IntentAnalyzer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Highest-scoring preset; ties go to the one declared first.
    pub fn select_preset(&self, input: &IntentInput) -> Option<&Preset> {
        let mut best: Option<(&Preset, usize)> = None;
        for preset in self.catalog.presets() {
            let score = preset.score(&input.use_cases, input.privacy);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((preset, score));
            }
        }
        best.map(|(preset, _)| preset)
    }

    /// Every catalog key with its resolved value and provenance, in catalog
    /// order.
    pub fn explain(&self, input: &IntentInput) -> Vec<Resolved> {
        let preset = self.select_preset(input);
        let mut resolved: Vec<Resolved> = self
            .catalog
            .all()
            .iter()
            .map(|setting| self.resolve_setting(setting, preset, input))
            .collect();

        for rule in self.catalog.overrides() {
            if !rule.matches(&input.use_cases) {
                continue;
            }
            if let Some(entry) = resolved.iter_mut().find(|r| r.key == rule.key) {
                entry.value = rule.value.clone();
                entry.provenance = Provenance::Override(rule.tag.clone());
            }
        }
        resolved
    }

    /// Build the profile for `input`.
    pub fn recommend(&self, input: &IntentInput) -> Profile {
        let preset = self.select_preset(input);
        let settings: PrefMap = self
            .explain(input)
            .into_iter()
            .map(|r| (r.key, r.value))
            .collect();

        let mut profile = Profile::new(profile_name(input), settings)
            .with_description(describe(input))
            .with_tags(input.use_cases.iter().cloned());
        if let Some(preset) = preset {
            profile = profile.with_base_preset(preset.id.clone());
        }

        tracing::info!(
            "Recommended '{}' from preset {} ({} settings)",
            profile.name,
            profile.base_preset.as_deref().unwrap_or("none"),
            profile.len()
        );
        profile
    }

    fn resolve_setting(
        &self,
        setting: &Setting,
        preset: Option<&Preset>,
        input: &IntentInput,
    ) -> Resolved {
        let seeded = preset.and_then(|p| p.values.get(&setting.key).map(|v| (p, v)));
        let (mut value, mut provenance) = match seeded {
            Some((p, v)) => (v.clone(), Provenance::Preset(p.id.clone())),
            None => (setting.default.clone(), Provenance::Default),
        };

        if let Some(harden) = &setting.harden {
            let wanted = setting.intent_tags.iter().any(|t| input.use_cases.contains(t))
                || input.privacy >= harden.min_level;
            if wanted && input.tolerates(setting.breakage) {
                value = harden.value.clone();
                provenance = Provenance::Hardened;
            }
        }

        Resolved {
            key: setting.key.clone(),
            value,
            provenance,
        }
    }
}

fn profile_name(input: &IntentInput) -> String {
    let term = input.privacy.term();
    match &input.primary {
        Some(tag) => format!("{} - {}", title_case(tag), term),
        None => format!("{term} Profile"),
    }
}

fn describe(input: &IntentInput) -> String {
    let use_cases = if input.use_cases.is_empty() {
        "none".to_string()
    } else {
        input
            .use_cases
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Generated for use cases: {}; privacy: {}; breakage tolerance: {}%",
        use_cases, input.privacy, input.breakage_tolerance
    )
}

fn title_case(tag: &str) -> String {
    tag.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
