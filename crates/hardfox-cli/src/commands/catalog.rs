//! Catalog listing commands

use colored::Colorize;
use hardfox_catalog::{Setting, SettingKind, Tier};

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Run the settings command
pub fn run_settings(ctx: &AppContext, category: Option<&str>, tier: Option<Tier>) -> Result<()> {
    let categories = ctx.catalog.categories();
    if let Some(wanted) = category
        && !categories.contains(&wanted)
    {
        return Err(CliError::user(format!(
            "Unknown category '{}'. Valid: {}",
            wanted,
            categories.join(", ")
        )));
    }

    let mut shown = 0;
    for cat in categories {
        if category.is_some_and(|c| c != cat) {
            continue;
        }
        let settings: Vec<&Setting> = ctx
            .catalog
            .by_category(cat)
            .filter(|s| tier.is_none_or(|t| s.tier == t))
            .collect();
        if settings.is_empty() {
            continue;
        }

        println!("{}:", cat.cyan().bold());
        for setting in settings {
            println!(
                "  {:<50} {:<9} {:<10} {:>2} {}",
                setting.key.green(),
                setting.tier.as_str(),
                describe_kind(&setting.kind),
                setting.breakage,
                setting.name
            );
        }
        println!();
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No settings match.".dimmed());
    }
    println!(
        "{} {} settings in catalog {}",
        "Total:".dimmed(),
        ctx.catalog.len(),
        ctx.catalog.version()
    );
    Ok(())
}

fn describe_kind(kind: &SettingKind) -> String {
    match kind {
        SettingKind::Dropdown { options, .. } => format!("dropdown/{}", options.len()),
        other => other.name().to_string(),
    }
}

/// Run the presets command
pub fn run_presets(ctx: &AppContext) -> Result<()> {
    println!("{}", "Available Presets".bold());
    println!();
    for preset in ctx.catalog.presets() {
        let use_cases: Vec<&str> = preset.use_cases.iter().map(String::as_str).collect();
        println!(
            "  {:<20} {:<10} {}",
            preset.id.green(),
            preset.privacy_level.as_str(),
            use_cases.join(", ").dimmed()
        );
        if !preset.description.is_empty() {
            println!("  {:<20} {}", "", preset.description);
        }
    }
    Ok(())
}
