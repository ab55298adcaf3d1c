//! `dockyard manifest`: Write the service-registry manifest.

use std::path::PathBuf;

use clap::Args;
use dockyard_common::config::DockyardConfig;
use dockyard_compose::registry::ServiceRegistry;

use crate::output;

/// Arguments for the `manifest` command.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Write the manifest here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the manifest to the configured manifest path.
    #[arg(short, long, conflicts_with = "output")]
    pub write: bool,
}

/// Executes the `manifest` command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the manifest cannot
/// be written.
pub fn execute(config: &DockyardConfig, args: ManifestArgs) -> anyhow::Result<()> {
    let registry = ServiceRegistry::load(&config.catalog_file)?;
    let manifest = registry.manifest();
    let target = args
        .output
        .or_else(|| args.write.then(|| config.manifest_file.clone()));
    match target {
        Some(ref path) => Ok(manifest.persist(path)?),
        None => output::emit(&manifest.to_json_pretty()?),
    }
}
