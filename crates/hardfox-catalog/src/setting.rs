//! Validated catalog entries

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use hardfox_prefs::{CallForm, PrefValue, WriteMode};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Which preference file a setting lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// `prefs.js`; the user may change the value afterwards.
    Baseline,
    /// `user.js`; re-applied on every browser start.
    Enforced,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Baseline, Tier::Enforced];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Baseline => "prefs.js",
            Self::Enforced => "user.js",
        }
    }

    /// Enforced values use the `pref(` form, baseline values `user_pref(`.
    pub fn call_form(&self) -> CallForm {
        match self {
            Self::Baseline => CallForm::UserPref,
            Self::Enforced => CallForm::Pref,
        }
    }

    /// Baseline files are merged, enforced files hold exactly the managed set.
    pub fn write_mode(&self) -> WriteMode {
        match self {
            Self::Baseline => WriteMode::Merge,
            Self::Enforced => WriteMode::Replace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Enforced => "enforced",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(Self::Baseline),
            "enforced" => Ok(Self::Enforced),
            other => Err(format!("unknown tier '{other}' (expected baseline or enforced)")),
        }
    }
}

/// How much privacy the user asked for, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Basic,
    Moderate,
    Strong,
    Maximum,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 4] = [
        PrivacyLevel::Basic,
        PrivacyLevel::Moderate,
        PrivacyLevel::Strong,
        PrivacyLevel::Maximum,
    ];

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::Maximum => "maximum",
        }
    }

    /// Human term used in generated profile names.
    pub fn term(&self) -> &'static str {
        match self {
            Self::Basic => "Standard",
            Self::Moderate => "Balanced",
            Self::Strong => "Privacy Pro",
            Self::Maximum => "Maximum Privacy",
        }
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown privacy level '{s}' (expected basic, moderate, strong or maximum)")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderRange {
    Int { min: i64, max: i64, step: i64 },
    Float { min: f64, max: f64, step: f64 },
}

impl SliderRange {
    fn check(&self, key: &str, value: &PrefValue) -> Result<(), ValidationError> {
        match (self, value) {
            (Self::Int { min, max, step }, PrefValue::Int(v)) => {
                if v < min || v > max {
                    return Err(out_of_range(key, value, min, max));
                }
                if (i128::from(*v) - i128::from(*min)) % i128::from(*step) != 0 {
                    return Err(misaligned(key, value, min, step));
                }
                Ok(())
            }
            (Self::Float { min, max, step }, PrefValue::Float(v)) => {
                if !v.is_finite() || v < min || v > max {
                    return Err(out_of_range(key, value, min, max));
                }
                let steps = (v - min) / step;
                if (steps - steps.round()).abs() > 1e-9 {
                    return Err(misaligned(key, value, min, step));
                }
                Ok(())
            }
            (Self::Int { .. }, other) => Err(wrong_type(key, "integer", other)),
            (Self::Float { .. }, other) => Err(wrong_type(key, "float", other)),
        }
    }
}

/// The shape of values a setting accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Toggle,
    Slider(SliderRange),
    Dropdown {
        options: Vec<PrefValue>,
        labels: Vec<String>,
    },
    /// Any value of the same type as the default.
    FreeInput,
}

impl SettingKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Slider(_) => "slider",
            Self::Dropdown { .. } => "dropdown",
            Self::FreeInput => "free_input",
        }
    }
}

/// Privacy-hardening candidate for a setting.
#[derive(Debug, Clone, PartialEq)]
pub struct Hardening {
    pub value: PrefValue,
    /// Lowest privacy level that selects the hardened value on its own.
    pub min_level: PrivacyLevel,
}

/// One managed preference.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub key: String,
    pub name: String,
    pub description: String,
    pub warning: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tier: Tier,
    pub kind: SettingKind,
    pub default: PrefValue,
    /// 0-10 estimate of how likely the hardened value breaks sites.
    pub breakage: u8,
    pub intent_tags: BTreeSet<String>,
    pub harden: Option<Hardening>,
}

impl Setting {
    /// Check that `value` fits this setting's kind and constraints.
    pub fn check(&self, value: &PrefValue) -> Result<(), ValidationError> {
        let key = self.key.as_str();
        match &self.kind {
            SettingKind::Toggle => match value {
                PrefValue::Bool(_) => Ok(()),
                other => Err(wrong_type(key, "boolean", other)),
            },
            SettingKind::Slider(range) => range.check(key, value),
            SettingKind::Dropdown { options, .. } => {
                if options.contains(value) {
                    Ok(())
                } else {
                    Err(ValidationError::NotAnOption {
                        key: key.to_string(),
                        value: value.to_literal(),
                        options: options
                            .iter()
                            .map(PrefValue::to_literal)
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
                }
            }
            SettingKind::FreeInput => {
                if value.same_type(&self.default) {
                    Ok(())
                } else {
                    Err(wrong_type(key, self.default.type_name(), value))
                }
            }
        }
    }

    /// Display label for a dropdown value, falling back to its literal.
    pub fn label_for(&self, value: &PrefValue) -> String {
        if let SettingKind::Dropdown { options, labels } = &self.kind
            && let Some(idx) = options.iter().position(|o| o == value)
            && let Some(label) = labels.get(idx)
        {
            return label.clone();
        }
        value.to_literal()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.intent_tags.contains(tag)
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &PrefValue) -> ValidationError {
    ValidationError::WrongType {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn out_of_range<T: fmt::Display>(key: &str, value: &PrefValue, min: &T, max: &T) -> ValidationError {
    ValidationError::OutOfRange {
        key: key.to_string(),
        value: value.to_literal(),
        min: min.to_string(),
        max: max.to_string(),
    }
}

fn misaligned<T: fmt::Display>(key: &str, value: &PrefValue, min: &T, step: &T) -> ValidationError {
    ValidationError::Misaligned {
        key: key.to_string(),
        value: value.to_literal(),
        min: min.to_string(),
        step: step.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider(min: i64, max: i64, step: i64) -> Setting {
        Setting {
            key: "s".into(),
            name: "S".into(),
            description: String::new(),
            warning: None,
            category: "performance".into(),
            subcategory: None,
            tier: Tier::Enforced,
            kind: SettingKind::Slider(SliderRange::Int { min, max, step }),
            default: PrefValue::Int(min),
            breakage: 0,
            intent_tags: BTreeSet::new(),
            harden: None,
        }
    }

    #[test]
    fn int_slider_bounds_and_step() {
        let s = slider(10, 50, 5);
        assert!(s.check(&PrefValue::Int(10)).is_ok());
        assert!(s.check(&PrefValue::Int(50)).is_ok());
        assert!(matches!(
            s.check(&PrefValue::Int(55)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            s.check(&PrefValue::Int(12)),
            Err(ValidationError::Misaligned { .. })
        ));
        assert!(matches!(
            s.check(&PrefValue::Bool(true)),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn float_slider_tolerates_rounding() {
        let mut s = slider(0, 1, 1);
        s.kind = SettingKind::Slider(SliderRange::Float {
            min: 0.0,
            max: 1.0,
            step: 0.1,
        });
        assert!(s.check(&PrefValue::Float(0.3)).is_ok());
        assert!(s.check(&PrefValue::Float(0.35)).is_err());
        assert!(s.check(&PrefValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn privacy_levels_are_ordered() {
        assert!(PrivacyLevel::Basic < PrivacyLevel::Maximum);
        assert_eq!(PrivacyLevel::Strong.ordinal(), 2);
        assert_eq!("STRONG".parse::<PrivacyLevel>(), Ok(PrivacyLevel::Strong));
        assert!("extreme".parse::<PrivacyLevel>().is_err());
    }

    #[test]
    fn tiers_map_to_files() {
        assert_eq!(Tier::Baseline.file_name(), "prefs.js");
        assert_eq!(Tier::Enforced.call_form(), CallForm::Pref);
        assert_eq!(Tier::Enforced.write_mode(), WriteMode::Replace);
    }
}
