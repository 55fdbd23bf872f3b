//! envsync CLI
//!
//! Compare two content-store environments, narrow a snapshot to a
//! selection, remap its default locale, and apply it to a target.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use envsync_core::logging_facility::{init, Profile};
use envsync_store::{load_config, RunConfig};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "envsync")]
#[command(about = "envsync - compare and migrate content between environments", long_about = None)]
struct Cli {
    /// Run configuration (TOML); every section is optional
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Logging profile, overriding the configuration file
    #[arg(long, global = true)]
    log_profile: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Diff two snapshots
    Compare(commands::compare::CompareArgs),
    /// Narrow a snapshot to selected entries, content types and locales
    Resolve(commands::resolve::ResolveArgs),
    /// Rename a locale throughout a snapshot
    Remap(commands::remap::RemapArgs),
    /// Write a snapshot to the target environment
    Apply(commands::apply::ApplyArgs),
}

fn setup(cli: &Cli) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    let profile = match cli.log_profile {
        Some(profile) => profile,
        None => config.logging.profile.parse::<Profile>()?,
    };
    init(profile);
    tracing::debug!(
        config = ?cli.config,
        space_id = ?config.target.space_id,
        environment_id = %config.target.environment_id,
        "configuration loaded"
    );
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match setup(&cli) {
        Ok(config) => match cli.command {
            Commands::Compare(args) => commands::compare::execute(args, &config).await,
            Commands::Resolve(args) => commands::resolve::execute(args, &config).await,
            Commands::Remap(args) => commands::remap::execute(args, &config).await,
            Commands::Apply(args) => commands::apply::execute(args, &config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
