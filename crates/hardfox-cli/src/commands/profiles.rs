//! Saved profile commands

use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::ProfilesAction;
use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Run a profiles subcommand
pub fn run_profiles(ctx: &AppContext, action: ProfilesAction) -> Result<()> {
    let library = ctx.library();
    match action {
        ProfilesAction::List => {
            let profiles = library.list()?;
            if profiles.is_empty() {
                println!(
                    "{} (use {} to add one)",
                    "No saved profiles".dimmed(),
                    "hardfox recommend --save".cyan()
                );
                return Ok(());
            }
            for summary in profiles {
                let modified = summary
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "  {:<40} {:<16} {:>4} settings  {}",
                    summary.name.green(),
                    modified.dimmed(),
                    summary.settings,
                    summary.base.unwrap_or_default()
                );
            }
        }
        ProfilesAction::Show { name, changed } => {
            let profile = library.load(&name)?;
            println!("{}", profile.name.bold());
            if !profile.description.is_empty() {
                println!("{}", profile.description.dimmed());
            }
            if changed {
                for change in profile.diff_from_defaults(&ctx.catalog) {
                    println!("  {:<50} {}", change.key, change.value.to_literal().green());
                }
            } else {
                for (key, value) in profile.settings() {
                    println!("  {:<50} {}", key, value.to_literal());
                }
            }
        }
        ProfilesAction::Delete { name, yes } => {
            if !library.exists(&name)? {
                return Err(CliError::user(format!("No saved profile named '{name}'")));
            }
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete profile '{name}'?"))
                    .default(false)
                    .interact()?;
            if !confirmed {
                return Err(CliError::user("Delete cancelled by user."));
            }
            library.delete(&name)?;
            println!("{} Deleted {}", "-".red(), name);
        }
    }
    Ok(())
}
