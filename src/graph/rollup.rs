//! Derives folder- and file-level edges from buffered type references and
//! folds them into the project-level edges of the run.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use crate::core::resource::{ResourceIdentity, ResourceTree, TypeBridge};
use crate::graph::run::RunScope;
use crate::graph::sink::EdgeSink;
use crate::graph::types::{DependencyEdge, EdgeId, EdgeKey, EdgeLevel, Usage};

/// Counters from one rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupStats {
    /// Project-level edges emitted with their final weight
    pub project_edges: usize,
    /// Folder-level edges emitted
    pub folder_edges: usize,
    /// File-level edges emitted
    pub file_edges: usize,
    /// Type references dropped (unresolved target or inconsistent hierarchy)
    pub skipped: usize,
}

/// Ownership chain of one file: `file -> folder -> project`.
struct Chain {
    folder: Arc<ResourceIdentity>,
    project: Option<Arc<ResourceIdentity>>,
}

/// Rolls buffered type references up the resource hierarchy.
///
/// Runs once per report, after the streaming pass. Every cross-folder type
/// reference adds 1 to the folder edge between the owning folders and
/// produces a fresh file edge of weight 1. When the folders belong to two
/// projects it also adds 1 to the project edge between them and the folder
/// edge becomes its child; folders of one project get a folder edge with no
/// parent. Edges are staged in hierarchy order: project edges, then folder
/// edges, then file edges.
pub fn roll_up(run: &mut RunScope, tree: &dyn ResourceTree, bridge: &dyn TypeBridge) -> RollupStats {
    let mut stats = RollupStats::default();
    let mut folder_edges: IndexMap<EdgeKey, DependencyEdge> = IndexMap::new();
    let mut file_edges: Vec<DependencyEdge> = Vec::new();

    for (source_type, deps) in run.cache.take_type_dependencies() {
        let Some(from_chain) = chain_of(&deps.owner, tree) else {
            for _ in &deps.targets {
                run.diagnostics.inconsistent_rollup(
                    deps.owner.key(),
                    deps.owner.key(),
                    format!("file declaring {source_type} has no owning folder"),
                );
                stats.skipped += 1;
            }
            continue;
        };

        for target_type in &deps.targets {
            let Some(target) = run.resolver.resolve_type(target_type, bridge) else {
                run.diagnostics.unresolved_type(target_type, &source_type);
                stats.skipped += 1;
                continue;
            };
            let Some(to_chain) = chain_of(&target, tree) else {
                run.diagnostics.inconsistent_rollup(
                    deps.owner.key(),
                    target.key(),
                    format!("file declaring {target_type} has no owning folder"),
                );
                stats.skipped += 1;
                continue;
            };

            if from_chain.folder.key() == to_chain.folder.key() {
                let id = run.cache.allocate_id();
                file_edges.push(DependencyEdge::new(
                    id,
                    EdgeLevel::File,
                    deps.owner.clone(),
                    target,
                    Usage::Uses,
                    None,
                ));
                continue;
            }

            let project_id = match bump_project_edge(run, &from_chain, &to_chain) {
                ProjectLink::Edge(id) => Some(id),
                ProjectLink::SameProject => None,
                ProjectLink::Missing => {
                    stats.skipped += 1;
                    continue;
                }
            };

            let folder_key = EdgeKey::between(&from_chain.folder, &to_chain.folder);
            let folder_id = match folder_edges.get_mut(&folder_key) {
                Some(edge) => {
                    edge.increment();
                    edge.id
                }
                None => {
                    let id = run.cache.allocate_id();
                    folder_edges.insert(
                        folder_key,
                        DependencyEdge::new(
                            id,
                            EdgeLevel::Folder,
                            from_chain.folder.clone(),
                            to_chain.folder.clone(),
                            Usage::Uses,
                            project_id,
                        ),
                    );
                    id
                }
            };

            let id = run.cache.allocate_id();
            file_edges.push(DependencyEdge::new(
                id,
                EdgeLevel::File,
                deps.owner.clone(),
                target,
                Usage::Uses,
                Some(folder_id),
            ));
        }
    }

    for edge in run.cache.project_edges() {
        info!(
            "Updating dependency from {} to {}",
            edge.from.display_name(),
            edge.to.display_name()
        );
        run.journal.record_edge(edge);
        stats.project_edges += 1;
    }
    for edge in folder_edges.values().chain(file_edges.iter()) {
        info!(
            "Saving dependency from {} to {}",
            edge.from.display_name(),
            edge.to.display_name()
        );
        run.journal.record_edge(edge);
    }
    stats.folder_edges = folder_edges.len();
    stats.file_edges = file_edges.len();

    stats
}

fn chain_of(file: &ResourceIdentity, tree: &dyn ResourceTree) -> Option<Chain> {
    let folder = tree.parent(file)?;
    let project = tree.parent(&folder);
    Some(Chain { folder, project })
}

/// Project-level parent of a folder edge.
enum ProjectLink {
    /// Cross-project edge that received the observation
    Edge(EdgeId),
    /// Both folders belong to one project; there is no project edge to bump
    SameProject,
    /// Recorded as inconsistent; the reference is skipped
    Missing,
}

/// Adds one observation to the project edge spanning the two chains.
/// Project edges are never created here: a missing cross-project edge is
/// recorded and the reference is skipped.
fn bump_project_edge(run: &mut RunScope, from: &Chain, to: &Chain) -> ProjectLink {
    let (Some(project_from), Some(project_to)) = (&from.project, &to.project) else {
        run.diagnostics.inconsistent_rollup(
            from.folder.key(),
            to.folder.key(),
            "folder has no owning project",
        );
        return ProjectLink::Missing;
    };

    if project_from.key() == project_to.key() {
        return ProjectLink::SameProject;
    }

    let key = EdgeKey::between(project_from, project_to);
    match run.cache.project_edge_mut(&key) {
        Some(edge) => {
            edge.increment();
            ProjectLink::Edge(edge.id)
        }
        None => {
            run.diagnostics.inconsistent_rollup(
                project_from.key(),
                project_to.key(),
                "no References edge between these two projects",
            );
            ProjectLink::Missing
        }
    }
}

#[cfg(test)]
#[path = "rollup_tests.rs"]
mod tests;
