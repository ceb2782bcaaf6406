//! Writing profiles into a browser profile directory
//!
//! [`ApplyOrchestrator::apply`] validates the whole profile, claims the target
//! directory, then writes each selected tier through a [`PrefStore`]:
//! baseline values are merged into `prefs.js`, enforced values replace
//! `user.js`. A failing tier is reported without stopping the other one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use hardfox_catalog::{Catalog, Tier};
use hardfox_fs::DirectoryGuard;
use hardfox_prefs::{PrefMap, PrefStore, StoreOptions};
use serde::Serialize;

use crate::profile::Profile;
use crate::{Error, Result};

/// Which tiers an apply touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Baseline,
    Enforced,
}

impl TierFilter {
    pub fn includes(&self, tier: Tier) -> bool {
        match self {
            Self::All => true,
            Self::Baseline => tier == Tier::Baseline,
            Self::Enforced => tier == Tier::Enforced,
        }
    }
}

impl From<Tier> for TierFilter {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Baseline => Self::Baseline,
            Tier::Enforced => Self::Enforced,
        }
    }
}

impl FromStr for TierFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Tier>().map(Self::from)
    }
}

impl fmt::Display for TierFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Baseline => f.write_str("baseline"),
            Self::Enforced => f.write_str("enforced"),
        }
    }
}

/// Result of writing one tier file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierOutcome {
    pub tier: Tier,
    pub file: PathBuf,
    pub written: usize,
    pub preserved: usize,
    pub changed: bool,
    pub backup: Option<PathBuf>,
    pub checksum: String,
}

/// A tier whose write failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyError {
    pub tier: Tier,
    pub file: String,
    pub message: String,
}

/// Report from [`ApplyOrchestrator::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyResult {
    /// Tiers that were written (or already up to date)
    pub tiers: Vec<TierOutcome>,
    /// Non-fatal notes, such as lines skipped while merging
    pub warnings: Vec<String>,
    /// Tiers that failed
    pub errors: Vec<ApplyError>,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keys written to `tier`; zero when the tier was skipped or failed.
    pub fn written(&self, tier: Tier) -> usize {
        self.outcome(tier).map_or(0, |o| o.written)
    }

    pub fn outcome(&self, tier: Tier) -> Option<&TierOutcome> {
        self.tiers.iter().find(|o| o.tier == tier)
    }

    pub fn total_written(&self) -> usize {
        self.tiers.iter().map(|o| o.written).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub store: StoreOptions,
    /// Refuse directories without `prefs.js` or `times.json`.
    pub require_profile_markers: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            store: StoreOptions::default(),
            require_profile_markers: true,
        }
    }
}

/// Splits profiles by tier and writes them to disk.
#[derive(Debug, Clone)]
pub struct ApplyOrchestrator {
    catalog: Arc<Catalog>,
    options: ApplyOptions,
}

impl ApplyOrchestrator {
    pub fn new(catalog: Arc<Catalog>, options: ApplyOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> ApplyOptions {
        self.options
    }

    /// Write `profile` into `dir`.
    ///
    /// Fails before touching the disk when the profile does not validate,
    /// when another apply holds `dir`, or when `dir` is not a trusted
    /// profile directory. Per-tier write failures land in
    /// [`ApplyResult::errors`].
    pub fn apply(&self, profile: &Profile, dir: &Path, filter: TierFilter) -> Result<ApplyResult> {
        let violations = profile.validate(&self.catalog);
        if !violations.is_empty() {
            return Err(Error::InvalidProfile {
                name: profile.name.clone(),
                violations,
            });
        }

        let _guard = DirectoryGuard::acquire(dir).map_err(|e| match e {
            hardfox_fs::Error::Busy { path } => Error::Busy { path },
            other => Error::Fs(other),
        })?;

        let store = PrefStore::new(dir, self.options.store)?;
        if self.options.require_profile_markers && !store.validate_profile_dir() {
            return Err(hardfox_fs::Error::untrusted(
                store.root(),
                "not a browser profile (no prefs.js or times.json)",
            )
            .into());
        }

        let mut partitions = profile.by_tier(&self.catalog);
        let mut result = ApplyResult::default();

        for tier in Tier::ALL {
            if !filter.includes(tier) {
                continue;
            }
            let managed = partitions.remove(&tier).unwrap_or_default();
            if managed.is_empty() {
                result.warnings.push(format!(
                    "{}: profile has no {} settings, left untouched",
                    tier.file_name(),
                    tier
                ));
                continue;
            }
            self.write_tier(&store, tier, &managed, &mut result);
        }

        tracing::info!(
            "Applied '{}' to {} ({} keys, {} errors)",
            profile.name,
            store.root().display(),
            result.total_written(),
            result.errors.len()
        );
        Ok(result)
    }

    fn write_tier(&self, store: &PrefStore, tier: Tier, managed: &PrefMap, result: &mut ApplyResult) {
        let file = tier.file_name();
        match store.write(file, managed, tier.write_mode(), tier.call_form()) {
            Ok(outcome) => {
                result
                    .warnings
                    .extend(outcome.warnings.iter().map(|w| format!("{file}: {w}")));
                result.tiers.push(TierOutcome {
                    tier,
                    file: outcome.path,
                    written: outcome.written,
                    preserved: outcome.preserved,
                    changed: outcome.changed,
                    backup: outcome.backup,
                    checksum: outcome.checksum,
                });
            }
            Err(e) => {
                tracing::warn!("Writing {} failed: {}", file, e);
                result.errors.push(ApplyError {
                    tier,
                    file: file.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}
