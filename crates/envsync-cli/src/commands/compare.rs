//! Compare command

use std::path::PathBuf;

use clap::Args;
use envsync_core::diff::{render_summary, sort_by_title};
use envsync_core_types::RunContext;
use envsync_engine::Orchestrator;
use envsync_store::RunConfig;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Snapshot of the environment to migrate from
    #[arg(long)]
    pub source: PathBuf,

    /// Snapshot of the environment to migrate to
    #[arg(long)]
    pub target: PathBuf,

    /// Print the entry diff as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(
    args: CompareArgs,
    config: &RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::from_config(RunContext::new(), config);
    let source = orchestrator.load_snapshot(&args.source).await?;
    let target = orchestrator.load_snapshot(&args.target).await?;

    let mut comparison = orchestrator.compare(&source, &target)?;

    if args.json {
        sort_by_title(&mut comparison.entries);
        println!("{}", serde_json::to_string_pretty(&comparison.entries)?);
    } else {
        print!("{}", render_summary(&comparison));
    }

    Ok(())
}
