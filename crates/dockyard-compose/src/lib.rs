//! # dockyard-compose
//!
//! Dependency-closure resolution and mode-aware compose synthesis over a
//! catalog of service descriptions.
//!
//! Handles:
//! - **Registry**: The service catalog, its manifest view and dangling-edge pruning.
//! - **Resolver**: Transitive closure of a service selection.
//! - **Synthesizer**: Image, port and command rewriting per deployment mode.
//! - **Document**: Composition documents, persistence and blacklist pruning.
//! - **Graph**: Dependency-first startup order of a document.

pub mod api;
pub mod document;
pub mod graph;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod synthesizer;
