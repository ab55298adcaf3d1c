//! The service-registry manifest view of the catalog.
//!
//! The manifest names the compose identity `container` and leaves out every
//! compose-only field.

use std::path::Path;

use dockyard_common::error::{DockyardError, Result};
use serde::Serialize;

use crate::registry::ServiceRegistry;
use crate::service::{PgConnectionManager, ServiceLogs, ServiceRecord};

/// Filtered, serializable view of a registry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryManifest<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    services: Vec<ManifestEntry<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    deposed_services: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    unmanaged_services: &'a [String],
}

/// One service as it appears in the manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    container: &'a str,
    #[serde(skip_serializing_if = "<[u16]>::is_empty")]
    port: &'a [u16],
    #[serde(rename = "port80InDocker", skip_serializing_if = "is_false")]
    port80_in_docker: bool,
    #[serde(skip_serializing_if = "is_false")]
    ping_custom: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    custom_create: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    custom_delete: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    url: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    has_ping: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    install_type: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    bin_path: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    command_key_phrase: &'a str,
    #[serde(rename = "pgConnectionManager", skip_serializing_if = "Option::is_none")]
    pg_connection_manager: Option<&'a PgConnectionManager>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    dependencies: &'a [String],
    #[serde(skip_serializing_if = "<[ServiceLogs]>::is_empty")]
    logs: &'a [ServiceLogs],
    #[serde(skip_serializing_if = "is_false")]
    is_exclusively_linux: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    default_tag: &'a str,
}

impl<'a> From<&'a ServiceRecord> for ManifestEntry<'a> {
    fn from(s: &'a ServiceRecord) -> Self {
        Self {
            name: &s.name,
            container: &s.container,
            port: &s.port,
            port80_in_docker: s.port80_in_docker,
            ping_custom: s.ping_custom,
            custom_create: &s.custom_create,
            custom_delete: &s.custom_delete,
            url: &s.url,
            has_ping: s.has_ping,
            install_type: &s.install_type,
            bin_path: &s.bin_path,
            command_key_phrase: &s.command_key_phrase,
            pg_connection_manager: s.pg_connection_manager.as_ref(),
            dependencies: &s.dependencies,
            logs: &s.logs,
            is_exclusively_linux: s.is_exclusively_linux,
            default_tag: s.default_tag.as_deref().unwrap_or_default(),
        }
    }
}

impl ServiceRegistry {
    /// Builds the manifest view: excluded services are dropped and the rest
    /// are sorted by name.
    #[must_use]
    pub fn manifest(&self) -> RegistryManifest<'_> {
        let mut services: Vec<ManifestEntry<'_>> =
            self.filter_excluded().map(ManifestEntry::from).collect();
        services.sort_by(|a, b| a.name.cmp(b.name));
        RegistryManifest {
            services,
            deposed_services: self.deposed_services(),
            unmanaged_services: self.unmanaged_services(),
        }
    }
}

impl RegistryManifest<'_> {
    /// Number of services in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no service made it into the manifest.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Pretty-printed, tab-indented JSON in the layout of the existing
    /// `service-registry.json`: every line after the first starts with
    /// [`LINE_PREFIX`].
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be encoded.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(prefix_lines(&buf))
    }

    /// Writes the JSON manifest to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, or an I/O error naming `path`.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let bytes = self.to_json_pretty()?;
        tracing::info!(
            path = %path.display(),
            services = self.len(),
            "writing service registry manifest"
        );
        std::fs::write(path, bytes).map_err(|e| DockyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Prefix of every continuation line of the JSON manifest.
pub const LINE_PREFIX: &[u8] = b" ";

/// Inserts [`LINE_PREFIX`] after each newline. Encoded JSON strings never
/// hold a raw newline, so only layout newlines are touched.
fn prefix_lines(json: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(json.len() + json.len() / 8);
    for &byte in json {
        out.push(byte);
        if byte == b'\n' {
            out.extend_from_slice(LINE_PREFIX);
        }
    }
    out
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}
