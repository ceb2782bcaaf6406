//! Recommend command implementation

use std::path::PathBuf;

use colored::Colorize;
use hardfox_catalog::PrivacyLevel;
use hardfox_core::{IntentAnalyzer, IntentInput, Provenance, document};

use crate::context::AppContext;
use crate::error::Result;

pub struct RecommendArgs {
    pub tags: Vec<String>,
    pub privacy: PrivacyLevel,
    pub tolerance: u8,
    pub explain: bool,
    pub save: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Run the recommend command
pub fn run_recommend(ctx: &AppContext, args: RecommendArgs) -> Result<()> {
    let input = IntentInput::new(&args.tags, args.privacy, args.tolerance);
    let analyzer = IntentAnalyzer::new(ctx.catalog.clone());
    let mut profile = analyzer.recommend(&input);

    let mut notes = Vec::new();
    if args.save {
        let path = ctx.library().save(&mut profile)?;
        notes.push(format!("Saved to {}", path.display()));
    }
    if let Some(output) = &args.output {
        document::write_file(output, &profile, ctx.config.robustness())?;
        notes.push(format!("Wrote {}", output.display()));
    }

    if args.json {
        if args.explain {
            println!("{}", serde_json::to_string_pretty(&analyzer.explain(&input))?);
        } else {
            print!("{}", document::to_json(&profile)?);
        }
        for note in notes {
            eprintln!("{note}");
        }
        return Ok(());
    }

    println!("{}", profile.name.bold());
    println!("{}", profile.description.dimmed());
    println!(
        "{}: {}",
        "Preset".dimmed(),
        profile.base_preset.as_deref().unwrap_or("none").cyan()
    );
    println!();

    if args.explain {
        for resolved in analyzer.explain(&input) {
            let source = match &resolved.provenance {
                Provenance::Default => resolved.provenance.to_string().dimmed(),
                Provenance::Preset(_) => resolved.provenance.to_string().cyan(),
                Provenance::Hardened => resolved.provenance.to_string().green(),
                Provenance::Override(_) => resolved.provenance.to_string().yellow(),
            };
            println!("  {:<50} {:<12} {}", resolved.key, resolved.value.to_literal(), source);
        }
    } else {
        let changes = profile.diff_from_defaults(&ctx.catalog);
        println!("{} of {} settings differ from defaults:", changes.len(), profile.len());
        for change in changes {
            println!(
                "  {} {:<50} {} -> {}",
                "~".yellow(),
                change.key,
                change.default.to_literal().dimmed(),
                change.value.to_literal().green()
            );
        }
    }

    if !notes.is_empty() {
        println!();
        for note in notes {
            println!("{} {}", "+".green(), note);
        }
    }
    Ok(())
}
