//! Startup ordering of a composition document using `petgraph`.
//!
//! Purely informational: the order is reported, never executed.

use std::collections::HashMap;

use dockyard_common::error::{DockyardError, Result};
use petgraph::graph::NodeIndex;

use crate::document::CompositionDocument;

/// Directed graph of document services, edges pointing from a dependency
/// to its dependent.
#[derive(Debug)]
pub struct StartupGraph {
    graph: petgraph::Graph<String, ()>,
}

impl StartupGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
        }
    }

    /// Builds the graph of every service in `doc` and its `depends_on`
    /// edges. References to services outside the document are ignored.
    #[must_use]
    pub fn from_document(doc: &CompositionDocument) -> Self {
        let mut graph = Self::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for name in doc.services.keys() {
            let _ = nodes.insert(name.as_str(), graph.add_service(name.as_str()));
        }
        for (name, svc) in &doc.services {
            let Some(&dependent) = nodes.get(name.as_str()) else {
                continue;
            };
            for dep in svc.depends_on.iter() {
                if let Some(&dependency) = nodes.get(dep) {
                    graph.add_dependency(dependent, dependency);
                }
            }
        }
        graph
    }

    /// Adds a service node to the graph.
    pub fn add_service(&mut self, name: impl Into<String>) -> NodeIndex {
        self.graph.add_node(name.into())
    }

    /// Adds an edge: `dependent` depends on `dependency`.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.add_edge(dependency, dependent, ());
    }

    /// Returns service names with every dependency before its dependents.
    ///
    /// # Errors
    ///
    /// Returns an error if the services depend on each other in a cycle.
    pub fn startup_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(DockyardError::Config {
                message: format!(
                    "cyclic dependency detected involving \"{}\"",
                    self.graph
                        .node_weight(cycle.node_id())
                        .map_or("?", String::as_str)
                ),
            }),
        }
    }
}

impl Default for StartupGraph {
    fn default() -> Self {
        Self::new()
    }
}
