//! Catalog description of a deployable service and its compose entry.
//!
//! A [`ServiceRecord`] is what the catalog knows about a service. A
//! [`ComposeService`] is what ends up under `services:` in a composition
//! document after synthesis.

use std::collections::BTreeMap;

use dockyard_common::types::AttributeList;
use serde::{Deserialize, Serialize};

/// Opaque mapping value passed through to the compose document untouched.
pub type OpaqueMap = BTreeMap<String, serde_yaml::Value>;

/// One deployable unit as described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceRecord {
    /// Catalog key.
    pub name: String,
    /// Compose identity. Records without one are registry-only entries.
    pub container: String,
    /// Source repository name.
    pub repo_name: String,
    /// Explicit image reference. When absent one is synthesized.
    pub image: Option<String>,
    /// Never synthesize an image reference for this service.
    pub is_external_image: bool,
    /// Tag used when no tag is requested.
    pub default_tag: Option<String>,
    /// Container-internal ports that need an external binding.
    pub port: Vec<u16>,
    /// The service listens on port 80 inside its container.
    #[serde(rename = "port80InDocker")]
    pub port80_in_docker: bool,
    /// Pre-set compose port bindings. When non-empty they are kept as-is.
    pub port_bindings: AttributeList,
    /// The service answers a custom ping.
    pub ping_custom: bool,
    /// Custom create script.
    pub custom_create: String,
    /// Custom delete script.
    pub custom_delete: String,
    /// Service URL.
    pub url: String,
    /// The service exposes a ping endpoint.
    pub has_ping: bool,
    /// Install type.
    pub install_type: String,
    /// Binary path on the host.
    pub bin_path: String,
    /// Startup command. Replaced when the service depends on the database.
    pub command: Option<String>,
    /// Phrase identifying the running command.
    pub command_key_phrase: String,
    /// Postgres connection manager settings.
    #[serde(rename = "pgConnectionManager")]
    pub pg_connection_manager: Option<PgConnectionManager>,
    /// Manifest-level dependency names.
    pub dependencies: Vec<String>,
    /// Direct dependency edges, by catalog name.
    pub depends_on: AttributeList,
    /// Log files produced by the service.
    pub logs: Vec<ServiceLogs>,
    /// The service only runs on Linux hosts.
    pub is_exclusively_linux: bool,
    /// Leave the service out of the service-registry manifest.
    pub exclude_from_service_registry: bool,
    /// Compose fields passed through to the document unchanged.
    pub compose: ComposeOptions,
}

impl ServiceRecord {
    /// Creates a record whose catalog key and container identity are both
    /// `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            container: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Returns `true` if the record has a compose identity.
    #[must_use]
    pub fn is_containerized(&self) -> bool {
        !self.container.is_empty()
    }

    /// Returns `true` if the record depends on `db` or `dbpool`.
    #[must_use]
    pub fn depends_on_db(&self) -> bool {
        self.depends_on.contains(dockyard_common::constants::DB_SERVICE)
            || self
                .depends_on
                .contains(dockyard_common::constants::DB_POOL_SERVICE)
    }
}

/// `pgConnectionManager` block of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PgConnectionManager {
    /// Where the connection limit comes from.
    #[serde(rename = "maxPGConnectionSource")]
    pub max_pg_connection_source: String,
    /// Fixed connection limit.
    #[serde(rename = "maxPGConnection", skip_serializing_if = "is_zero")]
    pub max_pg_connection: i64,
    /// File holding the connection limit.
    #[serde(rename = "maxPGConnectionTextFile", skip_serializing_if = "String::is_empty")]
    pub max_pg_connection_text_file: String,
    /// Phrase locating the limit inside the text file.
    #[serde(rename = "maxPGConnectionKeyPhrase", skip_serializing_if = "String::is_empty")]
    pub max_pg_connection_key_phrase: String,
    /// Multiplier applied to the limit.
    #[serde(rename = "maxPGConnectionMultiplier", skip_serializing_if = "is_zero")]
    pub max_pg_connection_multiplier: i64,
}

/// One entry of a service's `logs` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLogs {
    /// Log name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Log file path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
    /// Parser applied to the log.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parser: String,
}

/// A service entry of a composition document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeService {
    /// Image reference.
    pub image: String,
    /// Published port bindings.
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub ports: AttributeList,
    /// Startup command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// Services that must start first.
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub depends_on: AttributeList,
    /// Remaining compose fields.
    #[serde(flatten)]
    pub options: ComposeOptions,
}

/// Compose fields that synthesis never rewrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ComposeOptions {
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub volumes: AttributeList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: OpaqueMap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub restart: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub deploy: OpaqueMap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub cap_add: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub cap_drop: AttributeList,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cgroup_parent: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub configs: AttributeList,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub container_name: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub dns: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub dns_opt: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub dns_search: AttributeList,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domainname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub entrypoint: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub env_file: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub expose: AttributeList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extends: OpaqueMap,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub external_links: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub extra_hosts: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub group_add: AttributeList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub healthcheck: OpaqueMap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(skip_serializing_if = "is_false")]
    pub init: bool,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub links: AttributeList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub logging: OpaqueMap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network_mode: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub networks: AttributeList,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub profiles: AttributeList,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pull_policy: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub secrets: AttributeList,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub shm_size: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stop_grace_period: String,
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub sysctls: AttributeList,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ulimits: OpaqueMap,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_name_as_container() {
        let svc = ServiceRecord::new("auth");
        assert_eq!(svc.name, "auth");
        assert_eq!(svc.container, "auth");
        assert!(svc.is_containerized());
    }

    #[test]
    fn depends_on_db_matches_db_and_pool() {
        let mut svc = ServiceRecord::new("search");
        assert!(!svc.depends_on_db());
        svc.depends_on.append(["dbpool"]);
        assert!(svc.depends_on_db());

        let mut other = ServiceRecord::new("auth");
        other.depends_on.append(["config", "db"]);
        assert!(other.depends_on_db());
    }

    #[test]
    fn empty_compose_entry_emits_only_image() {
        let entry = ComposeService {
            image: "imqs/auth:latest".into(),
            ..ComposeService::default()
        };
        let yaml = serde_yaml::to_string(&entry).expect("serialize");
        assert_eq!(yaml.lines().count(), 1, "got: {yaml}");
        assert!(yaml.starts_with("image:"), "got: {yaml}");
    }

    #[test]
    fn compose_entry_uses_snake_case_keys() {
        let mut entry = ComposeService::default();
        entry.depends_on.append(["db"]);
        entry.options.cap_add.append(["SYS_ADMIN"]);
        entry.options.init = true;
        let yaml = serde_yaml::to_string(&entry).expect("serialize");
        assert!(yaml.contains("depends_on:"), "got: {yaml}");
        assert!(yaml.contains("cap_add:"), "got: {yaml}");
        assert!(yaml.contains("init: true"), "got: {yaml}");
        assert!(!yaml.contains("restart"), "got: {yaml}");
    }

    #[test]
    fn catalog_record_reads_camel_case() {
        let yaml = r"
container: router
port: [80]
port80InDocker: true
defaultTag: v2
dependsOn: [auth]
excludeFromServiceRegistry: true
compose:
  restart: always
";
        let svc: ServiceRecord = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(svc.container, "router");
        assert_eq!(svc.port, vec![80]);
        assert!(svc.port80_in_docker);
        assert_eq!(svc.default_tag.as_deref(), Some("v2"));
        assert!(svc.depends_on.contains("auth"));
        assert!(svc.exclude_from_service_registry);
        assert_eq!(svc.compose.restart, "always");
    }
}
