//! Presets and override rules

use std::collections::BTreeSet;

use hardfox_prefs::{PrefMap, PrefValue};

use crate::setting::PrivacyLevel;

/// A named starting set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Use cases this preset is built for, lowercased.
    pub use_cases: BTreeSet<String>,
    pub privacy_level: PrivacyLevel,
    /// Values that differ from the catalog defaults.
    pub values: PrefMap,
}

impl Preset {
    /// Seed score for the given use cases and privacy level: two points per
    /// shared use case plus one for a matching level.
    pub fn score(&self, use_cases: &BTreeSet<String>, level: PrivacyLevel) -> usize {
        let overlap = self.use_cases.intersection(use_cases).count();
        2 * overlap + usize::from(self.privacy_level == level)
    }
}

/// Forces `key` to `value` whenever `tag` is among the declared use cases.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRule {
    pub tag: String,
    pub key: String,
    pub value: PrefValue,
}

impl OverrideRule {
    pub fn matches(&self, use_cases: &BTreeSet<String>) -> bool {
        use_cases.contains(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(use_cases: &[&str], level: PrivacyLevel) -> Preset {
        Preset {
            id: "p".into(),
            name: "P".into(),
            description: String::new(),
            use_cases: use_cases.iter().map(|s| s.to_string()).collect(),
            privacy_level: level,
            values: PrefMap::new(),
        }
    }

    fn tags(t: &[&str]) -> BTreeSet<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn score_weights_overlap_over_level() {
        let office = preset(&["work", "banking"], PrivacyLevel::Moderate);
        assert_eq!(office.score(&tags(&["banking"]), PrivacyLevel::Strong), 2);
        assert_eq!(office.score(&tags(&["banking", "work"]), PrivacyLevel::Moderate), 5);
        assert_eq!(office.score(&tags(&[]), PrivacyLevel::Moderate), 1);
    }

    #[test]
    fn override_matches_on_tag() {
        let rule = OverrideRule {
            tag: "banking".into(),
            key: "privacy.resistFingerprinting".into(),
            value: PrefValue::Bool(true),
        };
        assert!(rule.matches(&tags(&["shopping", "banking"])));
        assert!(!rule.matches(&tags(&["shopping"])));
    }
}
