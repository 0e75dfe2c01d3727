//! Edge sinks: where finished dependency edges are recorded.

use indexmap::IndexMap;

use crate::graph::types::{DependencyEdge, EdgeId, EdgeLevel};

/// Receives dependency edges.
///
/// The same edge id may be recorded more than once (project edges are
/// recorded during parsing and again with their final weight after rollup);
/// implementations treat a repeated id as an update.
pub trait EdgeSink {
    /// Records or updates `edge`.
    fn record_edge(&mut self, edge: &DependencyEdge);

    /// Lowest id a new run may allocate without colliding with recorded edges.
    fn next_edge_id(&self) -> EdgeId {
        EdgeId::new(0)
    }
}

/// In-memory sink that keeps the latest version of each edge in first-recorded order.
#[derive(Debug, Default, Clone)]
pub struct EdgeLog {
    edges: IndexMap<EdgeId, DependencyEdge>,
    next_id: u32,
}

impl EdgeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges in first-recorded order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.values()
    }

    /// Edge by id.
    pub fn get(&self, id: EdgeId) -> Option<&DependencyEdge> {
        self.edges.get(&id)
    }

    /// Edges at one aggregation level.
    pub fn at_level(&self, level: EdgeLevel) -> Vec<&DependencyEdge> {
        self.edges.values().filter(|edge| edge.level == level).collect()
    }

    /// Position at which `id` was first recorded.
    pub fn position(&self, id: EdgeId) -> Option<usize> {
        self.edges.get_index_of(&id)
    }

    /// True when every edge's parent is present and was recorded before it.
    pub fn parents_precede_children(&self) -> bool {
        self.edges.values().enumerate().all(|(index, edge)| match edge.parent {
            Some(parent) => self.position(parent).is_some_and(|at| at < index),
            None => true,
        })
    }

    /// Number of distinct edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Consumes the log, returning edges in first-recorded order.
    pub fn into_edges(self) -> Vec<DependencyEdge> {
        self.edges.into_values().collect()
    }
}

impl EdgeSink for EdgeLog {
    fn record_edge(&mut self, edge: &DependencyEdge) {
        self.next_id = self.next_id.max(edge.id.get().saturating_add(1));
        match self.edges.get_mut(&edge.id) {
            Some(existing) => *existing = edge.clone(),
            None => {
                self.edges.insert(edge.id, edge.clone());
            }
        }
    }

    fn next_edge_id(&self) -> EdgeId {
        EdgeId::new(self.next_id)
    }
}

/// Staging sink for one report.
///
/// Edges are replayed into the real sink, in recording order, only when
/// [`EdgeJournal::commit`] is called. Dropping an uncommitted journal
/// discards everything it holds.
#[derive(Debug, Default)]
pub struct EdgeJournal {
    entries: Vec<DependencyEdge>,
}

impl EdgeJournal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged records, updates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replays every staged record into `sink`. Returns the number of records.
    pub fn commit(self, sink: &mut dyn EdgeSink) -> usize {
        let count = self.entries.len();
        for edge in &self.entries {
            sink.record_edge(edge);
        }
        count
    }
}

impl EdgeSink for EdgeJournal {
    fn record_edge(&mut self, edge: &DependencyEdge) {
        self.entries.push(edge.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::ResourceIdentity;
    use crate::graph::types::Usage;
    use std::sync::Arc;

    fn edge(id: u32, level: EdgeLevel, parent: Option<u32>) -> DependencyEdge {
        DependencyEdge::new(
            EdgeId::new(id),
            level,
            Arc::new(ResourceIdentity::library(format!("from{id}"), "1")),
            Arc::new(ResourceIdentity::library(format!("to{id}"), "1")),
            Usage::Uses,
            parent.map(EdgeId::new),
        )
    }

    #[test]
    fn test_log_updates_in_place() {
        let mut log = EdgeLog::new();
        let mut project = edge(0, EdgeLevel::Project, None);
        log.record_edge(&project);
        log.record_edge(&edge(1, EdgeLevel::Folder, Some(0)));
        project.weight = 5;
        log.record_edge(&project);

        assert_eq!(log.len(), 2);
        assert_eq!(log.position(EdgeId::new(0)), Some(0));
        assert_eq!(log.get(EdgeId::new(0)).unwrap().weight, 5);
        assert!(log.parents_precede_children());
        assert_eq!(log.next_edge_id(), EdgeId::new(2));
    }

    #[test]
    fn test_log_detects_child_before_parent() {
        let mut log = EdgeLog::new();
        log.record_edge(&edge(1, EdgeLevel::Folder, Some(0)));
        log.record_edge(&edge(0, EdgeLevel::Project, None));
        assert!(!log.parents_precede_children());
    }

    #[test]
    fn test_journal_holds_edges_until_commit() {
        let mut journal = EdgeJournal::new();
        journal.record_edge(&edge(0, EdgeLevel::Project, None));
        journal.record_edge(&edge(1, EdgeLevel::Folder, Some(0)));
        assert_eq!(journal.len(), 2);

        let mut log = EdgeLog::new();
        assert_eq!(journal.commit(&mut log), 2);
        assert_eq!(log.at_level(EdgeLevel::Folder).len(), 1);
    }

    #[test]
    fn test_dropped_journal_emits_nothing() {
        let log = EdgeLog::new();
        {
            let mut journal = EdgeJournal::new();
            journal.record_edge(&edge(0, EdgeLevel::Project, None));
        }
        assert!(log.is_empty());
    }
}
