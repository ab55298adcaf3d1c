//! `dockyard plan`: Show the startup order of a compose file.

use std::path::PathBuf;

use clap::Args;
use dockyard_common::config::DockyardConfig;
use dockyard_compose::document::CompositionDocument;
use dockyard_compose::graph::StartupGraph;

use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Compose file to inspect. Defaults to the configured compose path.
    pub file: Option<PathBuf>,
}

/// Executes the `plan` command.
///
/// Lists the document's services with every dependency ahead of the
/// services that need it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the services depend on
/// each other in a cycle.
pub fn execute(config: &DockyardConfig, args: PlanArgs) -> anyhow::Result<()> {
    let file = args.file.as_ref().unwrap_or(&config.compose_file);
    let mut doc = CompositionDocument::default();
    doc.load_from(file)?;
    let order = StartupGraph::from_document(&doc).startup_order()?;

    let mut text = format!(
        "Startup order for {} (compose {}):\n",
        file.display(),
        doc.version
    );
    text.push_str(&output::numbered(&order));
    text.push_str(&format!("\n  {} service(s).\n", order.len()));
    output::emit(text.as_bytes())
}
