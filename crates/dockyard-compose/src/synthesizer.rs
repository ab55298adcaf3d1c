//! Mode-aware transformation of catalog records into compose entries.
//!
//! Every step here is a pure function of one record, the requested tag, the
//! mode and the router port, so the order services are visited in never
//! changes the result.

use std::collections::BTreeMap;

use dockyard_common::constants::{
    BINARY_INSTALL_DIR, BINARY_NAME_OVERRIDES, COMPOSE_VERSION, CONFIG_ENDPOINT, DB_SERVICE,
    DEFAULT_ORG_PREFIX, FALLBACK_TAG, LOOPBACK, ROUTER_INNER_PORT, ROUTER_SERVICE,
};
use dockyard_common::types::{AttributeList, ComposeMode};

use crate::document::CompositionDocument;
use crate::service::{ComposeService, ServiceRecord};

/// Builds composition documents from resolved selections.
#[derive(Debug, Clone)]
pub struct ComposeSynthesizer {
    org_prefix: String,
}

impl Default for ComposeSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_ORG_PREFIX)
    }
}

impl ComposeSynthesizer {
    /// Creates a synthesizer that names in-house images `<org_prefix>/...`.
    #[must_use]
    pub fn new(org_prefix: impl Into<String>) -> Self {
        Self {
            org_prefix: org_prefix.into(),
        }
    }

    /// Transforms every containerized record into a document entry keyed by
    /// its container identity.
    ///
    /// Records without a container identity are registry-only and are left
    /// out. Dependency names are rewritten from catalog names to the
    /// container identities the document is keyed by, and dependencies on
    /// services that did not make it into the document are pruned before it
    /// is returned.
    pub fn synthesize<'r, I>(
        &self,
        selected: I,
        tag: &str,
        mode: ComposeMode,
        router_port: u16,
    ) -> CompositionDocument
    where
        I: IntoIterator<Item = &'r ServiceRecord>,
    {
        tracing::info!(%mode, tag, router_port, "synthesizing composition document");
        let records: Vec<&ServiceRecord> = selected.into_iter().collect();
        let identities: BTreeMap<&str, &str> = records
            .iter()
            .copied()
            .filter(|r| r.is_containerized())
            .map(|r| (r.name.as_str(), r.container.as_str()))
            .collect();

        let mut doc = CompositionDocument::new(COMPOSE_VERSION);
        for record in records {
            if !record.is_containerized() {
                tracing::debug!(service = %record.name, "skipping registry-only service");
                continue;
            }
            let mut entry = self.transform(record, tag, mode, router_port);
            entry.depends_on = entry
                .depends_on
                .iter()
                .map(|dep| identities.get(dep).copied().unwrap_or(dep))
                .collect();
            let _ = doc.services.insert(record.container.clone(), entry);
        }
        doc.ensure_dependencies();
        doc
    }

    /// Applies image, port and command rewriting to a single record.
    #[must_use]
    pub fn transform(
        &self,
        record: &ServiceRecord,
        tag: &str,
        mode: ComposeMode,
        router_port: u16,
    ) -> ComposeService {
        let mut ports = record.port_bindings.clone();
        if ports.is_empty() && mode.publishes_ports(&record.container) {
            ports = port_bindings(record, router_port);
            tracing::debug!(
                service = %record.container,
                ports = ?ports.as_slice(),
                "computed port bindings"
            );
        }

        let mut command = record.command.clone().unwrap_or_default();
        if record.depends_on_db() {
            command = wait_for_postgres_command(&record.container);
            tracing::debug!(service = %record.container, "injected database wait");
        }

        ComposeService {
            image: self.resolve_image(record, tag),
            ports,
            command,
            depends_on: record.depends_on.clone(),
            options: record.compose.clone(),
        }
    }

    /// Returns the image reference a record is deployed from.
    ///
    /// Explicit and external images are kept unchanged. Otherwise the
    /// reference is `<org>/<container>:<tag>`, with the tag falling back to
    /// the record's default tag and then to `latest`.
    #[must_use]
    pub fn resolve_image(&self, record: &ServiceRecord, tag: &str) -> String {
        let explicit = record.image.as_deref().unwrap_or_default();
        if !explicit.is_empty() || record.is_external_image {
            return explicit.to_string();
        }
        let default_tag = record.default_tag.as_deref().unwrap_or_default();
        let resolved = if !tag.is_empty() {
            tag
        } else if !default_tag.is_empty() {
            default_tag
        } else {
            FALLBACK_TAG
        };
        format!("{}/{}:{resolved}", self.org_prefix, record.container)
    }
}

/// Computes `127.0.0.1:<external>:<internal>` bindings for a record.
///
/// A non-zero `router_port` replaces the router's own port list.
#[must_use]
pub fn port_bindings(record: &ServiceRecord, router_port: u16) -> AttributeList {
    let ports: Vec<u16> = if record.container == ROUTER_SERVICE && router_port != 0 {
        vec![router_port]
    } else {
        record.port.clone()
    };
    ports
        .into_iter()
        .map(|external| {
            let internal = if record.port80_in_docker {
                ROUTER_INNER_PORT
            } else {
                external
            };
            format!("{LOOPBACK}:{external}:{internal}")
        })
        .collect()
}

/// Startup command that waits for the config service and Postgres before
/// running the service binary.
#[must_use]
pub fn wait_for_postgres_command(container: &str) -> String {
    format!(
        "wait-for-nc.sh {CONFIG_ENDPOINT} -- wait-for-postgres.sh {DB_SERVICE} \
         {BINARY_INSTALL_DIR}{}",
        binary_name(container)
    )
}

/// Name of the binary installed in a container's image.
#[must_use]
pub fn binary_name(container: &str) -> &str {
    BINARY_NAME_OVERRIDES
        .iter()
        .find(|(identity, _)| *identity == container)
        .map_or(container, |&(_, binary)| binary)
}
