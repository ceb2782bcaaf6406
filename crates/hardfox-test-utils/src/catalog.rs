//! Fixture catalog
//!
//! Four settings across both tiers, two presets and one override rule. Small
//! enough to reason about exact outputs in assertions.

use std::sync::Arc;

use hardfox_catalog::Catalog;

pub const SMALL_CATALOG: &str = r#"
version = "fixture"

[[settings]]
key = "geo.enabled"
category = "security"
tier = "baseline"
kind = "toggle"
default = true
breakage = 1
harden = { value = false, min_level = "moderate" }

[[settings]]
key = "browser.cache.memory.capacity"
category = "performance"
tier = "baseline"
kind = "slider"
default = 256
min = 0
max = 1024
step = 64

[[settings]]
key = "network.trr.mode"
category = "security"
tier = "enforced"
kind = "dropdown"
default = 0
options = [0, 2, 3, 5]
labels = ["Off", "First", "Only", "Disabled"]
breakage = 3
intent_tags = ["privacy"]
harden = { value = 3, min_level = "maximum" }

[[settings]]
key = "privacy.resistFingerprinting"
category = "privacy"
tier = "enforced"
kind = "toggle"
default = false
breakage = 8
harden = { value = true, min_level = "maximum" }

[[presets]]
id = "everyday"
name = "Everyday"
use_cases = ["browsing"]
privacy_level = "basic"

[[presets]]
id = "fast"
name = "Fast"
use_cases = ["gaming"]
privacy_level = "basic"

[presets.values]
"browser.cache.memory.capacity" = 1024

[[overrides]]
tag = "banking"
key = "privacy.resistFingerprinting"
value = true
"#;

/// The fixture catalog, shared.
pub fn small_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_toml_str(SMALL_CATALOG).expect("fixture catalog is valid"))
}
