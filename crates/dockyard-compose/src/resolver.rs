//! Dependency closure over the catalog's `depends_on` relation.
//!
//! Edges are always read from the catalog, never from the selection, so
//! records already rewritten by synthesis cannot feed back into resolution.

use dockyard_common::error::{DockyardError, Result};

use crate::registry::{ServiceRegistry, Services};

/// Expands a selection of services to its transitive closure.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    catalog: &'a ServiceRegistry,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver reading edges from `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a ServiceRegistry) -> Self {
        Self { catalog }
    }

    /// Closes `selected` under the catalog's dependency relation.
    ///
    /// Passes over the selection repeat until one inserts nothing, which
    /// bounds the work by the catalog size and keeps cycles finite. Returns
    /// `true` if any service was added.
    ///
    /// On error `selected` is left exactly as it was passed in.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::NotFound`] if a selected service is not in
    /// the catalog, and [`DockyardError::MissingDependency`] if a reachable
    /// service names a dependency the catalog lacks.
    pub fn resolve(&self, selected: &mut Services) -> Result<bool> {
        tracing::info!(seed = selected.len(), "resolving service dependencies");
        let mut working = selected.clone();
        let mut changed = false;
        let mut passes = 0usize;

        loop {
            passes += 1;
            let mut inserted = false;
            let names: Vec<String> = working.keys().cloned().collect();
            for name in &names {
                let record = self.catalog.get(name).ok_or_else(|| DockyardError::NotFound {
                    kind: "service",
                    id: name.clone(),
                })?;
                for dep in &record.depends_on {
                    if working.contains_key(dep) {
                        continue;
                    }
                    let found = self
                        .catalog
                        .get(dep)
                        .ok_or_else(|| DockyardError::MissingDependency {
                            service: name.clone(),
                            dependency: dep.clone(),
                        })?;
                    tracing::debug!(service = %name, dependency = %dep, "adding dependency");
                    let _ = working.insert(dep.clone(), found.clone());
                    inserted = true;
                }
            }
            if !inserted {
                break;
            }
            changed = true;
        }

        tracing::info!(
            resolved = working.len(),
            passes,
            changed,
            "dependency resolution complete"
        );
        *selected = working;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::service::ServiceRecord;

    fn record(name: &str, deps: &[&str]) -> ServiceRecord {
        let mut svc = ServiceRecord::new(name);
        svc.depends_on.append(deps.iter().copied());
        svc
    }

    fn catalog() -> ServiceRegistry {
        ServiceRegistry::new()
            .with_service(record("router", &["auth", "www"]))
            .with_service(record("auth", &["db", "config"]))
            .with_service(record("www", &[]))
            .with_service(record("db", &[]))
            .with_service(record("config", &[]))
            .with_service(record("search", &["dbpool"]))
            .with_service(record("dbpool", &["db"]))
    }

    fn keys(services: &Services) -> BTreeSet<&str> {
        services.keys().map(String::as_str).collect()
    }

    #[test]
    fn closes_transitive_dependencies() {
        let catalog = catalog();
        let mut selected = catalog.select(["router"]).expect("select");
        let changed = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .expect("should resolve");

        assert!(changed);
        assert_eq!(
            keys(&selected),
            BTreeSet::from(["router", "auth", "www", "db", "config"])
        );
    }

    #[test]
    fn unreachable_services_stay_out() {
        let catalog = catalog();
        let mut selected = catalog.select(["auth"]).expect("select");
        let _ = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .expect("should resolve");
        assert!(!selected.contains_key("router"));
        assert!(!selected.contains_key("search"));
        assert!(!selected.contains_key("dbpool"));
    }

    #[test]
    fn resolving_closed_set_is_idempotent() {
        let catalog = catalog();
        let resolver = DependencyResolver::new(&catalog);
        let mut selected = catalog.select(["search"]).expect("select");
        assert!(resolver.resolve(&mut selected).expect("first"));

        let before = selected.clone();
        let changed = resolver.resolve(&mut selected).expect("second");
        assert!(!changed);
        assert_eq!(selected, before);
    }

    #[test]
    fn empty_selection_is_unchanged() {
        let catalog = catalog();
        let mut selected = Services::new();
        let changed = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .expect("should resolve");
        assert!(!changed);
        assert!(selected.is_empty());
    }

    #[test]
    fn cycle_terminates_from_either_seed() {
        let catalog = ServiceRegistry::new()
            .with_service(record("a", &["b"]))
            .with_service(record("b", &["a"]));
        let resolver = DependencyResolver::new(&catalog);

        for seed in ["a", "b"] {
            let mut selected = catalog.select([seed]).expect("select");
            let _ = resolver.resolve(&mut selected).expect("should resolve");
            assert_eq!(keys(&selected), BTreeSet::from(["a", "b"]));
        }
    }

    #[test]
    fn missing_dependency_fails_and_rolls_back() {
        let catalog = ServiceRegistry::new()
            .with_service(record("api", &["cache", "queue"]))
            .with_service(record("cache", &[]));
        let mut selected = catalog.select(["api"]).expect("select");
        let seed = selected.clone();

        let err = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .unwrap_err();
        assert!(
            matches!(
                &err,
                DockyardError::MissingDependency { service, dependency }
                    if service == "api" && dependency == "queue"
            ),
            "got: {err}"
        );
        assert_eq!(selected, seed);
    }

    #[test]
    fn edges_come_from_catalog_not_selection() {
        let catalog = catalog();
        let mut selected = catalog.select(["www"]).expect("select");
        selected
            .get_mut("www")
            .expect("www")
            .depends_on
            .append(["search"]);

        let changed = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .expect("should resolve");
        assert!(!changed);
        assert_eq!(keys(&selected), BTreeSet::from(["www"]));
    }

    #[test]
    fn seed_outside_catalog_fails() {
        let catalog = catalog();
        let mut selected = Services::new();
        let _ = selected.insert("ghost".into(), record("ghost", &[]));
        let err = DependencyResolver::new(&catalog)
            .resolve(&mut selected)
            .unwrap_err();
        assert!(err.to_string().contains("ghost"), "got: {err}");
    }
}
