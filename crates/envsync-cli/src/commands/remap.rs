//! Remap command

use std::path::PathBuf;

use clap::Args;
use envsync_core::diff::discover_locales;
use envsync_core::errors::{ExError, SyncError};
use envsync_core::remap;
use envsync_core_types::RunContext;
use envsync_engine::Orchestrator;
use envsync_store::{write_snapshot, RunConfig};

#[derive(Debug, Args)]
pub struct RemapArgs {
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Locale code to rename
    #[arg(long)]
    pub from: String,

    /// New locale code
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub out: PathBuf,
}

pub async fn execute(
    args: RemapArgs,
    config: &RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.from == args.to {
        return Err(ExError::from(SyncError::RemapOntoItself { code: args.from }).into());
    }

    let orchestrator = Orchestrator::from_config(RunContext::new(), config);
    let snapshot = orchestrator.load_snapshot(&args.snapshot).await?;
    if !discover_locales(&snapshot).contains(&args.from) {
        return Err(ExError::from(SyncError::UnknownLocale { code: args.from }).into());
    }

    let remapped = remap(&snapshot, &args.from, &args.to);
    write_snapshot(&args.out, &remapped)?;

    println!(
        "Remapped {} -> {} in {}",
        args.from,
        args.to,
        args.out.display()
    );
    Ok(())
}
