//! Preference file handling for hardfox
//!
//! - [`codec`] parses and serializes the `user_pref("key", value);` text
//!   format, skipping and reporting anything it cannot read.
//! - [`store`] reads and writes those files inside a trusted profile
//!   directory with timestamped backups and atomic replacement.

pub mod codec;
pub mod error;
pub mod store;
pub mod value;

pub use codec::{CallForm, ParseWarning, ParsedPrefs, WarningKind, decode, parse, serialize};
pub use error::{Error, Result};
pub use store::{PrefStore, StoreOptions, WriteMode, WriteOutcome};
pub use value::{PrefMap, PrefValue};
