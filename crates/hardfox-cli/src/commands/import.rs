//! Import command implementation

use std::path::Path;

use colored::Colorize;
use hardfox_core::import_profile;

use crate::context::AppContext;
use crate::error::Result;

/// Run the import command
pub fn run_import(ctx: &AppContext, dir: &Path, save: bool) -> Result<()> {
    let mut report = import_profile(&ctx.catalog, dir)?;

    println!("{}", report.profile.name.bold());
    println!(
        "{} managed settings found, {} other preferences ignored",
        report.profile.len(),
        report.unmanaged
    );
    for change in report.profile.diff_from_defaults(&ctx.catalog) {
        println!(
            "  {} {:<50} {}",
            "~".yellow(),
            change.key,
            change.value.to_literal().green()
        );
    }
    for skipped in &report.skipped {
        println!(
            "  {} {}: {} ({})",
            "skipped".yellow(),
            skipped.file,
            skipped.key,
            skipped.reason
        );
    }
    for (file, warning) in &report.warnings {
        tracing::debug!("{}: {}", file, warning);
    }

    if save {
        let path = ctx.library().save(&mut report.profile)?;
        println!("{} Saved to {}", "+".green(), path.display());
    }
    Ok(())
}
