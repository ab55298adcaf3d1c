//! Configuration models for the Dockyard tooling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DockyardError, Result};

/// Tool-wide defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockyardConfig {
    /// Organisation prefix of synthesized image references.
    pub org_prefix: String,
    /// Path of the service catalog.
    pub catalog_file: PathBuf,
    /// Path the composition document is written to.
    pub compose_file: PathBuf,
    /// Path the service-registry manifest is written to.
    pub manifest_file: PathBuf,
}

impl Default for DockyardConfig {
    fn default() -> Self {
        Self {
            org_prefix: crate::constants::DEFAULT_ORG_PREFIX.to_string(),
            catalog_file: PathBuf::from(crate::constants::DEFAULT_CATALOG_FILE),
            compose_file: PathBuf::from(crate::constants::DEFAULT_COMPOSE_FILE),
            manifest_file: PathBuf::from(crate::constants::DEFAULT_MANIFEST_FILE),
        }
    }
}

impl DockyardConfig {
    /// Reads tool defaults from a YAML file. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if it cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DockyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| DockyardError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Presentation options applied to a composition document immediately
/// before it is serialized.
///
/// None of these change what was resolved or synthesized; they only rewrite
/// published port bindings in the written copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    router_port_override: Option<u16>,
    suppress_non_router_ports: bool,
    https_router_binding: bool,
    db_port_override: Option<u16>,
}

impl WriteOptions {
    /// Starts a builder with every option at its default.
    #[must_use]
    pub fn builder() -> WriteOptionsBuilder {
        WriteOptionsBuilder::default()
    }

    /// Host port the router's `:80` binding is rewritten to.
    #[must_use]
    pub const fn router_port_override(&self) -> Option<u16> {
        self.router_port_override
    }

    /// Whether every binding except the router's is stripped.
    #[must_use]
    pub const fn suppress_non_router_ports(&self) -> bool {
        self.suppress_non_router_ports
    }

    /// Whether the router's `:443` binding survives a router override.
    #[must_use]
    pub const fn https_router_binding(&self) -> bool {
        self.https_router_binding
    }

    /// Host port the `db` binding is rewritten to.
    #[must_use]
    pub const fn db_port_override(&self) -> Option<u16> {
        self.db_port_override
    }

    /// Returns `true` if applying these options changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Builder for [`WriteOptions`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptionsBuilder {
    options: WriteOptions,
}

impl WriteOptionsBuilder {
    /// Rewrites the router's `:80` binding to `127.0.0.1:<port>:80`.
    #[must_use]
    pub const fn router_port(mut self, port: u16) -> Self {
        self.options.router_port_override = Some(port);
        self
    }

    /// Strips the port bindings of every service except the router.
    #[must_use]
    pub const fn suppress_non_router_ports(mut self, suppress: bool) -> Self {
        self.options.suppress_non_router_ports = suppress;
        self
    }

    /// Keeps the router's `:443` binding as `443:443` when the router port is
    /// overridden.
    #[must_use]
    pub const fn https(mut self, https: bool) -> Self {
        self.options.https_router_binding = https;
        self
    }

    /// Rewrites the `db` binding to `127.0.0.1:<port>:5432`.
    #[must_use]
    pub const fn db_port(mut self, port: u16) -> Self {
        self.options.db_port_override = Some(port);
        self
    }

    /// Validates and returns the options.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Config`] if a port is zero, or if the HTTPS
    /// flag is set without a router port override.
    pub fn build(self) -> Result<WriteOptions> {
        let opts = self.options;
        if opts.router_port_override == Some(0) {
            return Err(DockyardError::Config {
                message: "router port override must be non-zero".into(),
            });
        }
        if opts.db_port_override == Some(0) {
            return Err(DockyardError::Config {
                message: "db port override must be non-zero".into(),
            });
        }
        if opts.https_router_binding && opts.router_port_override.is_none() {
            return Err(DockyardError::Config {
                message: "https router binding requires a router port override".into(),
            });
        }
        Ok(opts)
    }
}
