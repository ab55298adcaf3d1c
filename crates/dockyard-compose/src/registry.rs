//! The service catalog.
//!
//! A [`ServiceRegistry`] is built once from configuration and is read-only
//! from the point of view of resolution and synthesis. It is always passed
//! explicitly; there is no process-wide default instance.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use dockyard_common::error::{DockyardError, Result};
use dockyard_common::types::AttributeList;
use serde::{Deserialize, Serialize};

use crate::service::ServiceRecord;

/// A selection of services keyed by catalog name.
pub type Services = BTreeMap<String, ServiceRecord>;

/// The full catalog of known services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceRegistry {
    services: Services,
    deposed_services: Vec<String>,
    unmanaged_services: Vec<String>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, keyed by its name, replacing any previous entry.
    #[must_use]
    pub fn with_service(mut self, record: ServiceRecord) -> Self {
        self.insert(record);
        self
    }

    /// Inserts a record keyed by its name.
    pub fn insert(&mut self, record: ServiceRecord) {
        let _ = self.services.insert(record.name.clone(), record);
    }

    /// Sets the deposed service names.
    #[must_use]
    pub fn with_deposed(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.deposed_services = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the unmanaged service names.
    #[must_use]
    pub fn with_unmanaged(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.unmanaged_services = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parses a catalog document (YAML or JSON).
    ///
    /// Record names default to their map key.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be decoded, or if a record
    /// carries a name that differs from its key.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut registry: Self = serde_yaml::from_str(content)?;
        for (key, record) in &mut registry.services {
            if record.name.is_empty() {
                record.name.clone_from(key);
            } else if record.name != *key {
                return Err(DockyardError::Config {
                    message: format!(
                        "catalog entry \"{key}\" is named \"{}\"",
                        record.name
                    ),
                });
            }
        }
        Ok(registry)
    }

    /// Reads a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading service catalog");
        let content = std::fs::read_to_string(path).map_err(|e| DockyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            DockyardError::Serialization { source } => DockyardError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Looks up a record by catalog name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceRecord> {
        self.services.get(name)
    }

    /// Returns `true` if the catalog has a record named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// All records keyed by name.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Names of deposed services. Informational only.
    #[must_use]
    pub fn deposed_services(&self) -> &[String] {
        &self.deposed_services
    }

    /// Names of unmanaged services. Informational only.
    #[must_use]
    pub fn unmanaged_services(&self) -> &[String] {
        &self.unmanaged_services
    }

    /// Records that belong in the service-registry manifest.
    ///
    /// Callers must not rely on the iteration order.
    pub fn filter_excluded(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.services
            .values()
            .filter(|s| !s.exclude_from_service_registry)
    }

    /// Removes every `depends_on` entry that names a service absent from
    /// the catalog. Idempotent.
    pub fn prune_dangling_dependencies(&mut self) {
        let known: BTreeSet<String> = self.services.keys().cloned().collect();
        for (name, record) in &mut self.services {
            let removed = prune_dangling(&mut record.depends_on, |dep| known.contains(dep));
            for dep in removed {
                tracing::debug!(
                    service = %name,
                    dependency = %dep,
                    "removed dangling catalog dependency"
                );
            }
        }
    }

    /// Seeds a selection with the named records.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::NotFound`] if a name is not in the catalog.
    pub fn select<I, S>(&self, names: I) -> Result<Services>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Services::new();
        for name in names {
            let name = name.as_ref();
            let record = self.get(name).ok_or_else(|| DockyardError::NotFound {
                kind: "service",
                id: name.to_string(),
            })?;
            let _ = selected.insert(name.to_string(), record.clone());
        }
        Ok(selected)
    }

    /// Seeds a selection with every record in the catalog.
    #[must_use]
    pub fn select_all(&self) -> Services {
        self.services.clone()
    }
}

/// Removes the entries of `deps` for which `is_known` is false, returning
/// the removed names in their original order.
pub(crate) fn prune_dangling(
    deps: &mut AttributeList,
    is_known: impl Fn(&str) -> bool,
) -> Vec<String> {
    let dangling: Vec<String> = deps
        .iter()
        .filter(|dep| !is_known(dep))
        .map(str::to_owned)
        .collect();
    for dep in &dangling {
        deps.remove(dep);
    }
    dangling
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, deps: &[&str]) -> ServiceRecord {
        let mut svc = ServiceRecord::new(name);
        svc.depends_on.append(deps.iter().copied());
        svc
    }

    #[test]
    fn filter_excluded_drops_flagged_records() {
        let mut hidden = record("tools", &[]);
        hidden.exclude_from_service_registry = true;
        let registry = ServiceRegistry::new()
            .with_service(record("auth", &[]))
            .with_service(hidden);

        let names: Vec<&str> = registry
            .filter_excluded()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["auth"]);
    }

    #[test]
    fn prune_removes_unknown_dependencies() {
        let mut registry = ServiceRegistry::new()
            .with_service(record("auth", &["db", "ghost", "db"]))
            .with_service(record("db", &[]));

        registry.prune_dangling_dependencies();
        let auth = registry.get("auth").expect("auth");
        assert_eq!(auth.depends_on.as_slice(), ["db", "db"]);

        let before = registry.clone();
        registry.prune_dangling_dependencies();
        assert_eq!(registry, before);
    }

    #[test]
    fn prune_removes_repeated_dangling_entries() {
        let mut deps: AttributeList = ["x", "keep", "x"].into_iter().collect();
        let removed = prune_dangling(&mut deps, |d| d == "keep");
        assert_eq!(removed, vec!["x", "x"]);
        assert_eq!(deps.as_slice(), ["keep"]);
    }

    #[test]
    fn select_unknown_name_fails() {
        let registry = ServiceRegistry::new().with_service(record("auth", &[]));
        let err = registry.select(["auth", "nope"]).unwrap_err();
        assert!(err.to_string().contains("nope"), "got: {err}");
    }

    #[test]
    fn from_yaml_fills_names_from_keys() {
        let yaml = r"
services:
  auth:
    container: auth
    dependsOn: [db]
  db:
    container: db
    isExternalImage: true
    image: postgres:13
deposedServices: [legacy]
";
        let registry = ServiceRegistry::from_yaml_str(yaml).expect("parse");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("auth").expect("auth").name, "auth");
        assert_eq!(registry.deposed_services(), ["legacy"]);
        assert!(registry.unmanaged_services().is_empty());
    }

    #[test]
    fn from_yaml_rejects_mismatched_name() {
        let yaml = "services:\n  auth:\n    name: other\n";
        assert!(ServiceRegistry::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = ServiceRegistry::load(Path::new("/nonexistent/catalog.yml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.yml"), "got: {err}");
    }
}
