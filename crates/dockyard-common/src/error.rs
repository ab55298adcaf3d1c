//! Unified error types for the Dockyard workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DockyardError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A document on disk could not be decoded.
    #[error("could not read '{path}' into a native yml object: {source}")]
    Parse {
        /// Path of the offending document.
        path: PathBuf,
        /// Underlying decoder error.
        source: serde_yaml::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A service names a dependency the catalog does not contain.
    #[error("dependency \"{dependency}\" of service \"{service}\" not found in catalog")]
    MissingDependency {
        /// Service whose dependency list holds the dangling name.
        service: String,
        /// The dependency name absent from the catalog.
        dependency: String,
    },

    /// YAML encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {source}")]
    Json {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DockyardError>;
