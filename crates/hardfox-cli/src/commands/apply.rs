//! Apply command implementation

use std::path::Path;

use colored::Colorize;
use hardfox_core::{ApplyOrchestrator, Profile, TierFilter, document};

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Run the apply command
pub fn run_apply(ctx: &AppContext, profile: &str, to: &Path, tier: TierFilter, json: bool) -> Result<()> {
    let profile = resolve_profile(ctx, profile)?;
    let result = ApplyOrchestrator::new(ctx.catalog.clone(), ctx.config.apply_options())
        .apply(&profile, to, tier)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Applied {} to {}", profile.name.bold(), to.display());
        for outcome in &result.tiers {
            let state = if outcome.changed {
                "written".green()
            } else {
                "unchanged".dimmed()
            };
            println!(
                "  {} {:<10} {:>4} keys, {} preserved ({})",
                "+".green(),
                outcome.tier.file_name(),
                outcome.written,
                outcome.preserved,
                state
            );
            if let Some(backup) = &outcome.backup {
                println!("      backup: {}", backup.display().to_string().dimmed());
            }
        }
        for warning in &result.warnings {
            println!("  {} {}", "warning:".yellow().bold(), warning);
        }
        for error in &result.errors {
            println!("  {} {}: {}", "x".red(), error.file, error.message);
        }
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} of the selected tiers failed",
            result.errors.len()
        )))
    }
}

/// A path to a document, or the name of a saved profile.
fn resolve_profile(ctx: &AppContext, arg: &str) -> Result<Profile> {
    let path = Path::new(arg);
    if path.is_file() {
        return Ok(document::read_file(path, &ctx.catalog)?);
    }
    Ok(ctx.library().load(arg)?)
}
