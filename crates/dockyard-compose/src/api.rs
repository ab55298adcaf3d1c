//! One-call entry points over an explicit registry.

use dockyard_common::error::Result;
use dockyard_common::types::ComposeMode;
use serde::{Deserialize, Serialize};

use crate::document::CompositionDocument;
use crate::registry::ServiceRegistry;
use crate::resolver::DependencyResolver;
use crate::synthesizer::ComposeSynthesizer;

/// Seed selection posted by clients that want a partial compose file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeServiceConfig {
    /// Services to start from. `None` selects the whole catalog.
    pub white_list: Option<Vec<String>>,
}

impl ComposeServiceConfig {
    /// Parses a JSON selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON of this shape.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Developer document of every containerized service in the catalog.
#[must_use]
pub fn developer_compose(registry: &ServiceRegistry) -> CompositionDocument {
    ComposeSynthesizer::default().synthesize(
        registry.services().values(),
        "",
        ComposeMode::Developer,
        0,
    )
}

/// Test-orchestrator document: only the router publishes ports.
#[must_use]
pub fn orchestrator_compose(registry: &ServiceRegistry, router_port: u16) -> CompositionDocument {
    ComposeSynthesizer::default().synthesize(
        registry.services().values(),
        "",
        ComposeMode::Orchestrator,
        router_port,
    )
}

/// Production document with images pinned to `tag`.
#[must_use]
pub fn production_compose(
    registry: &ServiceRegistry,
    tag: &str,
    router_port: u16,
) -> CompositionDocument {
    ComposeSynthesizer::default().synthesize(
        registry.services().values(),
        tag,
        ComposeMode::Production,
        router_port,
    )
}

/// JSON bytes of the service-registry manifest.
///
/// # Errors
///
/// Returns an error if the manifest cannot be encoded.
pub fn service_registry_json(registry: &ServiceRegistry) -> Result<Vec<u8>> {
    registry.manifest().to_json_pretty()
}

/// Selects `seeds` (or the whole catalog when `None`), closes the selection
/// over its dependencies and synthesizes it.
///
/// # Errors
///
/// Returns an error if a seed is unknown or the catalog names a dependency
/// it does not contain. No document is produced in that case.
pub fn compose_for(
    registry: &ServiceRegistry,
    synthesizer: &ComposeSynthesizer,
    seeds: Option<&[String]>,
    tag: &str,
    mode: ComposeMode,
    router_port: u16,
) -> Result<CompositionDocument> {
    let mut selected = match seeds {
        Some(names) => registry.select(names)?,
        None => registry.select_all(),
    };
    let _ = DependencyResolver::new(registry).resolve(&mut selected)?;
    Ok(synthesizer.synthesize(selected.values(), tag, mode, router_port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceRecord;

    fn registry() -> ServiceRegistry {
        let mut router = ServiceRecord::new("router");
        router.port = vec![80];
        router.port80_in_docker = true;
        router.depends_on.append(["auth"]);

        let mut auth = ServiceRecord::new("auth");
        auth.port = vec![2003];
        auth.depends_on.append(["db"]);

        let mut db = ServiceRecord::new("db");
        db.image = Some("postgres:13".into());
        db.is_external_image = true;

        let www = ServiceRecord::new("www");

        ServiceRegistry::new()
            .with_service(router)
            .with_service(auth)
            .with_service(db)
            .with_service(www)
    }

    #[test]
    fn developer_compose_covers_catalog() {
        let doc = developer_compose(&registry());
        assert_eq!(doc.services.len(), 4);
        assert_eq!(doc.services["auth"].ports.as_slice(), ["127.0.0.1:2003:2003"]);
        assert_eq!(doc.services["db"].image, "postgres:13");
    }

    #[test]
    fn orchestrator_compose_passes_router_port() {
        let doc = orchestrator_compose(&registry(), 8080);
        assert_eq!(doc.services["router"].ports.as_slice(), ["127.0.0.1:8080:80"]);
        assert!(doc.services["auth"].ports.is_empty());
    }

    #[test]
    fn production_compose_tags_images() {
        let doc = production_compose(&registry(), "2.1.0", 0);
        assert_eq!(doc.services["www"].image, "imqs/www:2.1.0");
        assert!(doc.services["router"].ports.is_empty());
    }

    #[test]
    fn compose_for_closes_seed() {
        let seeds = vec!["router".to_string()];
        let doc = compose_for(
            &registry(),
            &ComposeSynthesizer::default(),
            Some(seeds.as_slice()),
            "",
            ComposeMode::Developer,
            0,
        )
        .expect("should compose");
        let names: Vec<&str> = doc.services.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["auth", "db", "router"]);
        assert!(doc.services["auth"].command.contains("wait-for-postgres.sh"));
    }

    #[test]
    fn compose_for_unknown_seed_fails() {
        let seeds = vec!["nope".to_string()];
        let result = compose_for(
            &registry(),
            &ComposeSynthesizer::default(),
            Some(seeds.as_slice()),
            "",
            ComposeMode::Developer,
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn compose_for_keeps_edges_to_renamed_containers() {
        let mut auth = ServiceRecord::new("imqs-auth");
        auth.container = "auth".into();
        let mut router = ServiceRecord::new("router");
        router.depends_on.append(["imqs-auth"]);
        let registry = ServiceRegistry::new().with_service(router).with_service(auth);

        let seeds = vec!["router".to_string()];
        let doc = compose_for(
            &registry,
            &ComposeSynthesizer::default(),
            Some(seeds.as_slice()),
            "",
            ComposeMode::Developer,
            0,
        )
        .expect("should compose");
        let names: Vec<&str> = doc.services.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["auth", "router"]);
        assert_eq!(doc.services["router"].depends_on.as_slice(), ["auth"]);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = developer_compose(&registry()).to_yaml_string().expect("yaml");
        let b = developer_compose(&registry()).to_yaml_string().expect("yaml");
        assert_eq!(a, b);
    }

    #[test]
    fn whitelist_parses() {
        let cfg = ComposeServiceConfig::from_json_str(r#"{"whiteList":["router","www"]}"#)
            .expect("parse");
        assert_eq!(
            cfg.white_list.as_deref(),
            Some(["router".to_string(), "www".to_string()].as_slice())
        );
        let empty = ComposeServiceConfig::from_json_str("{}").expect("parse");
        assert!(empty.white_list.is_none());
    }
}
