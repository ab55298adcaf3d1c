//! Composition documents: assembly, persistence and blacklist pruning.
//!
//! Every mutating operation leaves the document closed: no `depends_on`
//! entry names a service the document does not contain.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use dockyard_common::config::WriteOptions;
use dockyard_common::constants::{
    DB_SERVICE, LOOPBACK, POSTGRES_PORT, ROUTER_INNER_HTTPS_PORT, ROUTER_INNER_PORT,
    ROUTER_SERVICE,
};
use dockyard_common::error::{DockyardError, Result};
use dockyard_common::types::AttributeList;
use serde::{Deserialize, Serialize};

use crate::registry::prune_dangling;
use crate::service::{ComposeService, OpaqueMap};

/// A versioned set of compose service entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionDocument {
    /// Compose file format version.
    pub version: String,
    /// Service entries keyed by container identity.
    #[serde(default)]
    pub services: BTreeMap<String, ComposeService>,
    /// Top-level secrets, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, OpaqueMap>,
}

impl CompositionDocument {
    /// Creates an empty document with the given version tag.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Parses a document from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid composition document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serializes the document to YAML as it stands.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns `true` if the document has an entry named `service`.
    #[must_use]
    pub fn has_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Replaces the whole document with the contents of `path`.
    ///
    /// Nothing held in memory before the call survives it.
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if it cannot be read or decoded. The
    /// document is untouched on error.
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "loading composition document");
        let content = std::fs::read_to_string(path).map_err(|e| DockyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        *self = serde_yaml::from_str(&content).map_err(|e| DockyardError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Renders the document with `options` applied to a copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    pub fn render(&self, options: &WriteOptions) -> Result<String> {
        if options.is_noop() {
            return self.to_yaml_string();
        }
        let mut copy = self.clone();
        copy.apply_write_options(options);
        copy.to_yaml_string()
    }

    /// Serializes the document with `options` applied and writes it to
    /// `path`. The in-memory document is not modified.
    ///
    /// # Errors
    ///
    /// Returns a serialization error before anything is written, or an I/O
    /// error naming `path` if the write fails.
    pub fn persist_to(&self, path: &Path, options: &WriteOptions) -> Result<()> {
        let rendered = self.render(options)?;
        tracing::info!(
            path = %path.display(),
            services = self.services.len(),
            "writing composition document"
        );
        std::fs::write(path, rendered).map_err(|e| DockyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Removes the named services, then prunes dependencies on them.
    pub fn delete_services<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if self.services.remove(name).is_some() {
                tracing::debug!(service = name, "deleted blacklisted service");
            }
        }
        self.ensure_dependencies();
    }

    /// Removes every `depends_on` entry that names a service absent from
    /// the document.
    pub fn ensure_dependencies(&mut self) {
        let known: BTreeSet<String> = self.services.keys().cloned().collect();
        for (name, svc) in &mut self.services {
            let removed = prune_dangling(&mut svc.depends_on, |dep| known.contains(dep));
            for dep in removed {
                tracing::debug!(service = %name, dependency = %dep, "removed dangling dependency");
            }
        }
    }

    /// Rewrites published bindings according to `options`.
    fn apply_write_options(&mut self, options: &WriteOptions) {
        if let Some(port) = options.router_port_override() {
            if let Some(router) = self.services.get_mut(ROUTER_SERVICE) {
                router.ports = rewrite_router_bindings(
                    &router.ports,
                    port,
                    options.https_router_binding(),
                );
            }
        }

        if options.suppress_non_router_ports() {
            for (name, svc) in &mut self.services {
                if name != ROUTER_SERVICE {
                    svc.ports = AttributeList::new();
                }
            }
        }

        if let Some(port) = options.db_port_override().filter(|p| *p != POSTGRES_PORT) {
            if let Some(db) = self.services.get_mut(DB_SERVICE) {
                db.ports = AttributeList::new().and([format!("{LOOPBACK}:{port}:{POSTGRES_PORT}")]);
            }
        }
    }
}

fn rewrite_router_bindings(bindings: &AttributeList, port: u16, https: bool) -> AttributeList {
    let http_suffix = format!(":{ROUTER_INNER_PORT}");
    let https_suffix = format!(":{ROUTER_INNER_HTTPS_PORT}");
    bindings
        .iter()
        .filter_map(|binding| {
            if binding.ends_with(&http_suffix) {
                Some(format!("{LOOPBACK}:{port}:{ROUTER_INNER_PORT}"))
            } else if binding.ends_with(&https_suffix) {
                https.then(|| format!("{ROUTER_INNER_HTTPS_PORT}:{ROUTER_INNER_HTTPS_PORT}"))
            } else {
                Some(binding.to_string())
            }
        })
        .collect()
}
