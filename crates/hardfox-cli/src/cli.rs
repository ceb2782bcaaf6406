//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use hardfox_catalog::{PrivacyLevel, Tier};
use hardfox_core::TierFilter;

/// hardfox - Privacy hardening for browser profiles
#[derive(Parser, Debug)]
#[command(name = "hardfox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "HARDFOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build a profile from use cases, a privacy level and a breakage tolerance
    ///
    /// Examples:
    ///   hardfox recommend banking shopping --privacy strong --tolerance 20
    ///   hardfox recommend gaming --explain
    ///   hardfox recommend banking --save
    ///   hardfox recommend --privacy maximum --output max.json
    Recommend {
        /// Use cases, e.g. banking, shopping, gaming, development
        tags: Vec<String>,

        /// Privacy level: basic, moderate, strong or maximum
        #[arg(short, long, default_value = "moderate")]
        privacy: PrivacyLevel,

        /// Breakage tolerance in percent
        #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        tolerance: u8,

        /// Show where every value comes from
        #[arg(long)]
        explain: bool,

        /// Store the profile in the library
        #[arg(long)]
        save: bool,

        /// Write the profile document to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write a profile into a browser profile directory
    ///
    /// Examples:
    ///   hardfox apply banking.json --to ~/.mozilla/firefox/abcd.default
    ///   hardfox apply "Banking - Privacy Pro" --to ./profile --tier enforced
    Apply {
        /// Profile document path or saved profile name
        profile: String,

        /// Browser profile directory
        #[arg(long)]
        to: PathBuf,

        /// Restrict to one tier: all, baseline or enforced
        #[arg(long, default_value = "all")]
        tier: TierFilter,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Read the managed values already set in a browser profile directory
    Import {
        /// Browser profile directory
        dir: PathBuf,

        /// Store the imported profile in the library
        #[arg(long)]
        save: bool,
    },

    /// List catalog settings
    Settings {
        /// Only settings in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only settings in this tier
        #[arg(short, long)]
        tier: Option<Tier>,
    },

    /// List catalog presets
    Presets,

    /// Manage saved profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   hardfox completions bash > ~/.local/share/bash-completion/completions/hardfox
    ///   hardfox completions zsh > ~/.zfunc/_hardfox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Saved profile actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfilesAction {
    /// List saved profiles, newest first
    List,

    /// Show the values of a saved profile
    Show {
        name: String,

        /// Only values that differ from the catalog defaults
        #[arg(long)]
        changed: bool,
    },

    /// Delete a saved profile
    Delete {
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
