//! hardfox CLI
//!
//! Recommends privacy-hardening profiles and applies them to browser
//! profile directories.

mod cli;
mod commands;
mod context;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::AppContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} privacy hardening for browser profiles", "hardfox".green().bold());
        println!();
        println!("Run {} for available commands.", "hardfox --help".cyan());
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "hardfox", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = AppContext::load(cli.config.as_deref())?;
    execute_command(&ctx, command)
}

/// `RUST_LOG` wins; otherwise debug when verbose, warnings only by default.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Recommend {
            tags,
            privacy,
            tolerance,
            explain,
            save,
            output,
            json,
        } => commands::run_recommend(
            ctx,
            commands::RecommendArgs {
                tags,
                privacy,
                tolerance,
                explain,
                save,
                output,
                json,
            },
        ),
        Commands::Apply {
            profile,
            to,
            tier,
            json,
        } => commands::run_apply(ctx, &profile, &to, tier, json),
        Commands::Import { dir, save } => commands::run_import(ctx, &dir, save),
        Commands::Settings { category, tier } => {
            commands::run_settings(ctx, category.as_deref(), tier)
        }
        Commands::Presets => commands::run_presets(ctx),
        Commands::Profiles { action } => commands::run_profiles(ctx, action),
        Commands::Completions { .. } => Ok(()),
    }
}
