//! `dockyard compose`: Resolve a selection and write a compose file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use dockyard_common::config::{DockyardConfig, WriteOptions};
use dockyard_common::types::ComposeMode;
use dockyard_compose::api::{ComposeServiceConfig, compose_for};
use dockyard_compose::registry::ServiceRegistry;
use dockyard_compose::synthesizer::ComposeSynthesizer;

use crate::output;

/// Deployment flavour of the generated file.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    /// Every service publishes its ports on localhost.
    Developer,
    /// Only the router publishes its ports.
    Orchestrator,
    /// No computed port bindings.
    Production,
}

impl From<ModeArg> for ComposeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Developer => Self::Developer,
            ModeArg::Orchestrator => Self::Orchestrator,
            ModeArg::Production => Self::Production,
        }
    }
}

/// Arguments for the `compose` command.
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Target deployment mode.
    #[arg(short, long, value_enum, default_value = "developer")]
    pub mode: ModeArg,

    /// Image tag for in-house services.
    #[arg(short, long, default_value = "")]
    pub tag: String,

    /// Host port the router is published on (0 keeps the catalog's ports).
    #[arg(long, default_value_t = 0)]
    pub router_port: u16,

    /// Services to start from (repeatable or comma-separated). Defaults to
    /// the whole catalog.
    #[arg(short, long = "service")]
    pub services: Vec<String>,

    /// JSON file with a `whiteList` of services to start from.
    #[arg(long, conflicts_with = "services")]
    pub whitelist: Option<PathBuf>,

    /// Organisation prefix of synthesized image references.
    #[arg(long)]
    pub org: Option<String>,

    /// Drop catalog dependencies on unknown services instead of failing.
    #[arg(long)]
    pub prune_dangling: bool,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Strip every port binding except the router's.
    #[arg(long)]
    pub suppress_ports: bool,

    /// Keep the router's HTTPS binding when overriding its port.
    #[arg(long, requires = "publish_router_port")]
    pub https: bool,

    /// Rewrite the router's port 80 binding to this host port when writing.
    #[arg(long)]
    pub publish_router_port: Option<u16>,

    /// Rewrite the db binding to this host port when writing.
    #[arg(long)]
    pub db_port: Option<u16>,
}

impl ComposeArgs {
    fn write_options(&self) -> anyhow::Result<WriteOptions> {
        let mut builder = WriteOptions::builder()
            .suppress_non_router_ports(self.suppress_ports)
            .https(self.https);
        if let Some(port) = self.publish_router_port {
            builder = builder.router_port(port);
        }
        if let Some(port) = self.db_port {
            builder = builder.db_port(port);
        }
        Ok(builder.build()?)
    }

    fn seeds(&self) -> anyhow::Result<Option<Vec<String>>> {
        if let Some(ref path) = self.whitelist {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("could not read '{}'", path.display()))?;
            return Ok(ComposeServiceConfig::from_json_str(&content)?.white_list);
        }
        let names = output::split_list(&self.services);
        Ok((!names.is_empty()).then_some(names))
    }
}

/// Executes the `compose` command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a service is unknown,
/// the catalog is inconsistent, or the document cannot be written.
pub fn execute(config: &DockyardConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let options = args.write_options()?;
    let mut registry = ServiceRegistry::load(&config.catalog_file)?;
    if args.prune_dangling {
        registry.prune_dangling_dependencies();
    }

    let seeds = args.seeds()?;
    let synthesizer = ComposeSynthesizer::new(args.org.as_deref().unwrap_or(&config.org_prefix));
    let doc = compose_for(
        &registry,
        &synthesizer,
        seeds.as_deref(),
        &args.tag,
        args.mode.into(),
        args.router_port,
    )?;
    tracing::info!(services = doc.services.len(), mode = ?args.mode, "composition ready");

    match args.output {
        Some(ref path) => Ok(doc.persist_to(path, &options)?),
        None => output::emit(doc.render(&options)?.as_bytes()),
    }
}
