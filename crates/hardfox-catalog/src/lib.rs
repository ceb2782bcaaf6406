//! Settings catalog for hardfox.
//!
//! The [`Catalog`] is the immutable description of every preference hardfox
//! manages: its tier, the shape of values it accepts, how likely hardening
//! it is to break sites, and which presets and override rules mention it.
//! It is built once, validated as a whole, and shared behind an `Arc`.

pub mod catalog;
pub mod error;
pub mod preset;
pub mod schema;
pub mod setting;

pub use catalog::Catalog;
pub use error::{Error, Result, ValidationError};
pub use preset::{OverrideRule, Preset};
pub use setting::{Hardening, PrivacyLevel, Setting, SettingKind, SliderRange, Tier};
