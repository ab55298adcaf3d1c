//! Domain primitive types used across the Dockyard workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered, string-backed list used for ports, volumes, dependency names and
/// the other list-valued fields of a service.
///
/// Order is insertion order and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeList(Vec<String>);

impl AttributeList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the list with `values` appended in argument order.
    #[must_use]
    pub fn and<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.append(values);
        self
    }

    /// Appends `values` in argument order.
    pub fn append<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(values.into_iter().map(Into::into));
    }

    /// Returns `true` if some element equals `value` exactly.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Removes the first element equal to `value`.
    ///
    /// Absent values and empty lists are a no-op. Later elements keep their
    /// relative order.
    pub fn remove(&mut self, value: &str) {
        if let Some(pos) = self.0.iter().position(|v| v == value) {
            let _ = self.0.remove(pos);
        }
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|v| keep(v));
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for AttributeList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Target flavour of a synthesized composition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeMode {
    /// Local development: every service publishes its ports.
    #[default]
    Developer,
    /// Test orchestrator: only the router publishes its ports.
    Orchestrator,
    /// Production: no computed bindings.
    Production,
}

impl ComposeMode {
    /// Returns `true` if a service with the given container identity gets
    /// computed port bindings in this mode.
    #[must_use]
    pub fn publishes_ports(self, container: &str) -> bool {
        match self {
            Self::Developer => true,
            Self::Orchestrator => container == crate::constants::ROUTER_SERVICE,
            Self::Production => false,
        }
    }
}

impl fmt::Display for ComposeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Developer => write!(f, "developer"),
            Self::Orchestrator => write!(f, "orchestrator"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_argument_order() {
        let list = AttributeList::new().and(["a", "b"]).and(["c"]);
        assert_eq!(list.as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut list: AttributeList = ["db"].into_iter().collect();
        list.append(["db"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn contains_is_case_sensitive() {
        let list: AttributeList = ["Router"].into_iter().collect();
        assert!(list.contains("Router"));
        assert!(!list.contains("router"));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut list: AttributeList = ["a", "b"].into_iter().collect();
        list.remove("z");
        assert_eq!(list.as_slice(), ["a", "b"]);
    }

    #[test]
    fn remove_on_empty_is_noop() {
        let mut list = AttributeList::new();
        list.remove("a");
        assert!(list.is_empty());
    }

    #[test]
    fn remove_only_first_match() {
        let mut list: AttributeList = ["x", "a", "y", "a", "z"].into_iter().collect();
        list.remove("a");
        assert_eq!(list.as_slice(), ["x", "y", "a", "z"]);
    }

    #[test]
    fn serializes_as_plain_sequence() {
        let list: AttributeList = ["db", "config"].into_iter().collect();
        let json = serde_json::to_string(&list).expect("serialize");
        assert_eq!(json, r#"["db","config"]"#);
    }

    #[test]
    fn orchestrator_publishes_router_only() {
        assert!(ComposeMode::Orchestrator.publishes_ports("router"));
        assert!(!ComposeMode::Orchestrator.publishes_ports("auth"));
        assert!(ComposeMode::Developer.publishes_ports("auth"));
        assert!(!ComposeMode::Production.publishes_ports("router"));
    }
}
