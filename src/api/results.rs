//! Analysis results and reporting structures.

use serde::{Deserialize, Serialize};

use crate::core::diagnostics::Diagnostic;
use crate::core::resource::{Qualifier, ResourceKey};
use crate::graph::builder::BuildStats;
use crate::graph::rollup::RollupStats;
use crate::graph::types::{DependencyEdge, EdgeId, EdgeLevel, Usage};

/// Outcome of analyzing one report for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Project the report was analyzed for
    pub project: ResourceKey,

    /// Report file, as given
    pub report: String,

    /// Counters from parsing and rollup
    pub stats: AnalysisStats,

    /// Non-fatal findings, in the order they were recorded
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisOutcome {
    /// True when the run recorded no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Counters for one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// `Assembly` elements read
    pub assemblies: usize,

    /// Assemblies skipped because they belong to another project
    pub skipped_assemblies: usize,

    /// `Reference` elements read
    pub references: usize,

    /// `(From, To)` type pairs buffered for rollup
    pub type_references: usize,

    /// Distinct project-level edges
    pub project_edges: usize,

    /// Folder-level edges
    pub folder_edges: usize,

    /// File-level edges
    pub file_edges: usize,

    /// Type references dropped during rollup
    pub skipped_type_references: usize,

    /// Edge records replayed into the sink (updates included)
    pub records_committed: usize,
}

impl AnalysisStats {
    pub(crate) fn from_run(build: BuildStats, rollup: RollupStats, records_committed: usize) -> Self {
        Self {
            assemblies: build.assemblies,
            skipped_assemblies: build.skipped_assemblies,
            references: build.references,
            type_references: build.type_references,
            project_edges: rollup.project_edges,
            folder_edges: rollup.folder_edges,
            file_edges: rollup.file_edges,
            skipped_type_references: rollup.skipped,
            records_committed,
        }
    }

    /// Total number of distinct edges produced.
    pub fn total_edges(&self) -> usize {
        self.project_edges + self.folder_edges + self.file_edges
    }

    /// Adds another run's counters to this one.
    pub fn accumulate(&mut self, other: &AnalysisStats) {
        self.assemblies += other.assemblies;
        self.skipped_assemblies += other.skipped_assemblies;
        self.references += other.references;
        self.type_references += other.type_references;
        self.project_edges += other.project_edges;
        self.folder_edges += other.folder_edges;
        self.file_edges += other.file_edges;
        self.skipped_type_references += other.skipped_type_references;
        self.records_committed += other.records_committed;
    }
}

/// Flat, serializable view of a [`DependencyEdge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Edge id, unique within its run
    pub id: EdgeId,

    /// Aggregation level
    pub level: EdgeLevel,

    /// Source key
    pub from: ResourceKey,

    /// Source kind
    pub from_kind: Qualifier,

    /// Target key
    pub to: ResourceKey,

    /// Target kind
    pub to_kind: Qualifier,

    /// Relationship kind
    pub usage: Usage,

    /// Accumulated weight
    pub weight: u32,

    /// Parent edge id
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<EdgeId>,
}

impl From<&DependencyEdge> for EdgeRecord {
    fn from(edge: &DependencyEdge) -> Self {
        Self {
            id: edge.id,
            level: edge.level,
            from: edge.from.key().clone(),
            from_kind: edge.from.qualifier(),
            to: edge.to.key().clone(),
            to_kind: edge.to.qualifier(),
            usage: edge.usage,
            weight: edge.weight,
            parent: edge.parent,
        }
    }
}
