//! System-wide constants and well-known service identities.

/// Version tag written into every synthesized composition document.
pub const COMPOSE_VERSION: &str = "3.2";

/// Organisation prefix used when synthesizing in-house image references.
pub const DEFAULT_ORG_PREFIX: &str = "imqs";

/// Tag used when neither a requested tag nor a default tag is available.
pub const FALLBACK_TAG: &str = "latest";

/// Container identity of the HTTP router.
pub const ROUTER_SERVICE: &str = "router";

/// Container identity of the Postgres database.
pub const DB_SERVICE: &str = "db";

/// Container identity of the Postgres connection pool.
pub const DB_POOL_SERVICE: &str = "dbpool";

/// Port the router listens on inside its container.
pub const ROUTER_INNER_PORT: u16 = 80;

/// HTTPS port the router listens on inside its container.
pub const ROUTER_INNER_HTTPS_PORT: u16 = 443;

/// Postgres port inside the database container.
pub const POSTGRES_PORT: u16 = 5432;

/// Host interface every computed binding is published on.
pub const LOOPBACK: &str = "127.0.0.1";

/// Endpoint a database-backed service waits on before probing Postgres.
pub const CONFIG_ENDPOINT: &str = "config:80";

/// Directory service binaries are installed into inside their images.
pub const BINARY_INSTALL_DIR: &str = "/opt/";

/// Container identities whose installed binary differs from the identity.
pub const BINARY_NAME_OVERRIDES: &[(&str, &str)] = &[("job", "imqs-jobservice")];

/// Default path of the service catalog.
pub const DEFAULT_CATALOG_FILE: &str = "catalog.yml";

/// Default path of the synthesized composition document.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Default path of the service-registry manifest.
pub const DEFAULT_MANIFEST_FILE: &str = "service-registry.json";

/// Binary name shown in CLI help and version output.
pub const APP_NAME: &str = "dockyard";
