//! CLI command definitions and dispatch.

pub mod compose;
pub mod manifest;
pub mod plan;
pub mod prune;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dockyard_common::config::DockyardConfig;
use dockyard_common::constants::APP_NAME;

/// Dockyard: compose files and service manifests from a service catalog.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the service catalog (YAML or JSON).
    #[arg(long, global = true, env = "DOCKYARD_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// YAML file with tool defaults.
    #[arg(long, global = true, env = "DOCKYARD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a selection and write a compose file.
    Compose(compose::ComposeArgs),
    /// Write the service-registry manifest.
    Manifest(manifest::ManifestArgs),
    /// Remove blacklisted services from an existing compose file.
    Prune(prune::PruneArgs),
    /// Show the dependency-first startup order of a compose file.
    Plan(plan::PlanArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = match cli.config {
        Some(ref path) => DockyardConfig::load(path)?,
        None => DockyardConfig::default(),
    };
    if let Some(catalog) = cli.catalog {
        config.catalog_file = catalog;
    }

    match cli.command {
        Command::Compose(args) => compose::execute(&config, args),
        Command::Manifest(args) => manifest::execute(&config, args),
        Command::Prune(args) => prune::execute(&config, args),
        Command::Plan(args) => plan::execute(&config, args),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_name_comes_from_constants() {
        assert_eq!(Cli::command().get_name(), APP_NAME);
    }

    #[test]
    fn compose_defaults_to_developer() {
        let cli = Cli::try_parse_from(["dockyard", "compose"]).expect("parse");
        let Command::Compose(args) = cli.command else {
            panic!("expected compose");
        };
        assert!(matches!(args.mode, compose::ModeArg::Developer));
        assert_eq!(args.router_port, 0);
        assert!(args.services.is_empty());
    }

    #[test]
    fn https_requires_router_port() {
        let result = Cli::try_parse_from(["dockyard", "compose", "--https"]);
        assert!(result.is_err());
        let ok = Cli::try_parse_from([
            "dockyard",
            "compose",
            "--https",
            "--publish-router-port",
            "8443",
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn prune_requires_blacklist() {
        assert!(Cli::try_parse_from(["dockyard", "prune"]).is_err());
        let cli = Cli::try_parse_from(["dockyard", "prune", "-b", "db,www", "--dry-run"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Prune(_)));
    }

    #[test]
    fn global_catalog_after_subcommand() {
        let cli = Cli::try_parse_from(["dockyard", "manifest", "--catalog", "svc.yml"])
            .expect("parse");
        assert_eq!(cli.catalog, Some(PathBuf::from("svc.yml")));
    }
}
