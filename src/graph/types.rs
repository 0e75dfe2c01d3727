//! Types for dependency edges.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::resource::{ResourceIdentity, ResourceKey};

/// Semantic relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// Explicit binary reference between assemblies
    Compile,
    /// Usage derived from type-level references
    Uses,
}

/// Aggregation level of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLevel {
    /// Module/library to module/library
    Project,
    /// Directory to directory
    Folder,
    /// File to file
    File,
}

/// Run-unique edge identifier. Parent links refer to edges by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Wraps a raw id.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered `(from, to)` key under which equivalent edges are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    /// Source resource
    pub from: ResourceKey,
    /// Target resource
    pub to: ResourceKey,
}

impl EdgeKey {
    /// Key between two identities.
    pub fn between(from: &ResourceIdentity, to: &ResourceIdentity) -> Self {
        Self {
            from: from.key().clone(),
            to: to.key().clone(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.from, self.to)
    }
}

/// A dependency between two resources.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEdge {
    /// Run-unique id
    pub id: EdgeId,
    /// Aggregation level
    pub level: EdgeLevel,
    /// Source endpoint
    pub from: Arc<ResourceIdentity>,
    /// Target endpoint
    pub to: Arc<ResourceIdentity>,
    /// Relationship kind
    pub usage: Usage,
    /// Number of observations folded into this edge, at least 1
    pub weight: u32,
    /// Enclosing edge one level up
    pub parent: Option<EdgeId>,
}

impl DependencyEdge {
    /// Creates an edge with weight 1.
    pub fn new(
        id: EdgeId,
        level: EdgeLevel,
        from: Arc<ResourceIdentity>,
        to: Arc<ResourceIdentity>,
        usage: Usage,
        parent: Option<EdgeId>,
    ) -> Self {
        Self {
            id,
            level,
            from,
            to,
            usage,
            weight: 1,
            parent,
        }
    }

    /// Merge key of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::between(&self.from, &self.to)
    }

    /// Folds one more observation into the edge.
    pub fn increment(&mut self) {
        self.weight = self.weight.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_display_joins_with_newline() {
        let key = EdgeKey {
            from: ResourceKey::new("acme:Core"),
            to: ResourceKey::new("lib:log4net:1.2"),
        };
        assert_eq!(key.to_string(), "acme:Core\nlib:log4net:1.2");
    }

    #[test]
    fn test_new_edge_starts_at_weight_one() {
        let from = Arc::new(ResourceIdentity::library("a", "1"));
        let to = Arc::new(ResourceIdentity::library("b", "1"));
        let mut edge = DependencyEdge::new(
            EdgeId::new(0),
            EdgeLevel::Project,
            from,
            to,
            Usage::Compile,
            None,
        );
        assert_eq!(edge.weight, 1);
        edge.increment();
        edge.increment();
        assert_eq!(edge.weight, 3);
        assert_eq!(edge.key().from.as_str(), "lib:a:1");
    }
}
