//! Core layer for hardfox
//!
//! Turns a stated intent into a [`Profile`] and writes profiles into a
//! browser profile directory:
//!
//! - **IntentAnalyzer**: deterministic preset seeding, hardening and override rules
//! - **ApplyOrchestrator**: tier partitioning, single-flight per directory, per-tier reports
//! - **ProfileLibrary**: saved profile documents
//! - **Importer**: profiles from values already present on disk
//!
//! # Architecture
//!
//! ```text
//!                 hardfox-cli
//!                      |
//!                hardfox-core
//!                      |
//!          +-----------+-----------+
//!          |                       |
//!   hardfox-catalog         hardfox-prefs
//!          |                       |
//!          +------ hardfox-fs -----+
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use hardfox_catalog::{Catalog, PrivacyLevel};
//! use hardfox_core::{ApplyOptions, ApplyOrchestrator, IntentAnalyzer, IntentInput, TierFilter};
//!
//! fn example() -> hardfox_core::Result<()> {
//!     let catalog = Arc::new(Catalog::builtin()?);
//!     let input = IntentInput::new(["banking"], PrivacyLevel::Strong, 20);
//!     let profile = IntentAnalyzer::new(catalog.clone()).recommend(&input);
//!
//!     let result = ApplyOrchestrator::new(catalog, ApplyOptions::default())
//!         .apply(&profile, Path::new("/path/to/profile"), TierFilter::All)?;
//!     assert!(result.is_success());
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod config;
pub mod document;
pub mod error;
pub mod import;
pub mod intent;
pub mod library;
pub mod profile;

pub use apply::{ApplyError, ApplyOptions, ApplyOrchestrator, ApplyResult, TierFilter, TierOutcome};
pub use config::HardfoxConfig;
pub use document::{DOCUMENT_VERSION, ProfileDocument};
pub use error::{Error, Result};
pub use import::{ImportReport, SkippedPref, import_profile};
pub use intent::{IntentAnalyzer, IntentInput, Provenance, Resolved};
pub use library::{ProfileLibrary, ProfileSummary, sanitize_name};
pub use profile::{Profile, SettingChange};
