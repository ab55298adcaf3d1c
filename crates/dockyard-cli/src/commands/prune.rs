//! `dockyard prune`: Remove blacklisted services from a compose file.

use std::path::PathBuf;

use clap::Args;
use dockyard_common::config::{DockyardConfig, WriteOptions};
use dockyard_compose::document::CompositionDocument;

use crate::output;

/// Arguments for the `prune` command.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Compose file to prune. Defaults to the configured compose path.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Services to remove (repeatable or comma-separated).
    #[arg(short, long, required = true)]
    pub blacklist: Vec<String>,

    /// Write the result here instead of back to `--file`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result instead of writing it.
    #[arg(long, conflicts_with = "output")]
    pub dry_run: bool,
}

/// Executes the `prune` command.
///
/// # Errors
///
/// Returns an error if the compose file cannot be read or written.
pub fn execute(config: &DockyardConfig, args: PruneArgs) -> anyhow::Result<()> {
    let file = args.file.as_ref().unwrap_or(&config.compose_file);
    let mut doc = CompositionDocument::default();
    doc.load_from(file)?;

    let blacklist = output::split_list(&args.blacklist);
    let before = doc.services.len();
    doc.delete_services(&blacklist);
    tracing::info!(
        removed = before - doc.services.len(),
        remaining = doc.services.len(),
        "pruned blacklisted services"
    );

    let options = WriteOptions::default();
    if args.dry_run {
        return output::emit(doc.render(&options)?.as_bytes());
    }
    let target = args.output.as_ref().unwrap_or(file);
    Ok(doc.persist_to(target, &options)?)
}
