//! Resolve command

use std::path::PathBuf;

use clap::Args;
use envsync_core::model::Selection;
use envsync_core_types::RunContext;
use envsync_engine::Orchestrator;
use envsync_store::{write_snapshot, RunConfig};

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Entry to migrate (repeatable)
    #[arg(long = "entry")]
    pub entries: Vec<String>,

    /// Content type whose entries to migrate (repeatable)
    #[arg(long = "content-type")]
    pub content_types: Vec<String>,

    /// Locale to keep (repeatable); all locales when omitted
    #[arg(long = "locale")]
    pub locales: Vec<String>,

    /// Where to write the narrowed snapshot
    #[arg(long)]
    pub out: PathBuf,
}

impl ResolveArgs {
    fn selection(&self) -> Selection {
        Selection {
            entry_ids: self.entries.iter().cloned().collect(),
            locale_codes: self.locales.iter().cloned().collect(),
            content_type_ids: self.content_types.iter().cloned().collect(),
        }
    }
}

pub async fn execute(
    args: ResolveArgs,
    config: &RunConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::from_config(RunContext::new(), config);
    let snapshot = orchestrator.load_snapshot(&args.snapshot).await?;

    let narrowed = orchestrator.resolve_selection(&args.selection(), snapshot)?;
    write_snapshot(&args.out, &narrowed)?;

    println!(
        "Wrote {} entries, {} assets, {} content types to {}",
        narrowed.entries.len(),
        narrowed.assets.len(),
        narrowed.content_types.len(),
        args.out.display()
    );
    Ok(())
}
