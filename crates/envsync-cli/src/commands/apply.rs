//! Apply command

use std::path::PathBuf;

use clap::Args;
use envsync_core_types::RunContext;
use envsync_engine::adapters::HttpTargetClient;
use envsync_engine::{MigrationReport, Orchestrator};
use envsync_store::{management_token, RunConfig};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Snapshot to write (usually the output of `resolve`)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Target space, overriding `target.space_id`
    #[arg(long)]
    pub space: Option<String>,

    /// Target environment, overriding `target.environment_id`
    #[arg(long)]
    pub environment: Option<String>,

    /// API base URL, overriding `target.base_url`
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(
    args: ApplyArgs,
    config: &RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let space_id = args
        .space
        .or_else(|| config.target.space_id.clone())
        .ok_or("No target space: pass --space or set target.space_id")?;
    let environment_id = args
        .environment
        .unwrap_or_else(|| config.target.environment_id.clone());
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.target.base_url.clone());
    let token = management_token()?;

    let context = RunContext::new().with_environments(
        args.snapshot.display().to_string(),
        environment_id.clone(),
    );
    let orchestrator = Orchestrator::from_config(context, config);
    let snapshot = orchestrator.load_snapshot(&args.snapshot).await?;

    let client = HttpTargetClient::new(base_url, space_id, environment_id, token);
    let report = orchestrator.apply(snapshot, &client).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_failures() {
        return Err(format!("{} record(s) failed", report.failed.len()).into());
    }
    if report.timed_out {
        return Err("Apply timed out; skipped records were not written".into());
    }
    Ok(())
}

fn print_report(report: &MigrationReport) {
    println!("Run {}:", report.run_id);
    println!("  {}", report.summary());
    if let Some(remap) = &report.remapped_locale {
        println!("  locale remapped: {} -> {}", remap.from, remap.to);
    }
    for ct in &report.content_types {
        println!("  content type {}: {:?}", ct.content_type_id, ct.outcome);
    }
    for failure in &report.failed {
        println!(
            "  FAILED {} {}: {}",
            failure.kind.as_str(),
            failure.entry_id,
            failure.error
        );
    }
}
