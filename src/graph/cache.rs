//! Run-scoped memo of project-level edges and buffered type references.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::resource::ResourceIdentity;
use crate::graph::types::{DependencyEdge, EdgeId, EdgeKey, EdgeLevel, Usage};

/// Referenced type names accumulated for one source type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDependencies {
    /// File declaring the source type (last registration wins)
    pub owner: Arc<ResourceIdentity>,
    /// Target type names in report order, duplicates kept
    pub targets: Vec<String>,
}

/// Edge cache for one analysis run.
///
/// Holds the project-level edges observed in `References` sections, keyed by
/// `(from, to)`, and the type references buffered for rollup, keyed by the
/// source type's fully qualified name. Also allocates edge ids for the run.
/// Not shared between runs or threads.
#[derive(Debug, Default)]
pub struct DependencyCache {
    project_edges: IndexMap<EdgeKey, DependencyEdge>,
    type_dependencies: IndexMap<String, TypeDependencies>,
    next_id: u32,
}

impl DependencyCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache whose first allocated id is `first`.
    pub fn starting_at(first: EdgeId) -> Self {
        Self {
            next_id: first.get(),
            ..Self::default()
        }
    }

    /// Allocates a fresh edge id.
    pub fn allocate_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts a project-level edge with weight 1, or increments the existing one.
    pub fn merge_project_edge(
        &mut self,
        from: Arc<ResourceIdentity>,
        to: Arc<ResourceIdentity>,
        usage: Usage,
    ) -> &DependencyEdge {
        let key = EdgeKey::between(&from, &to);
        if self.project_edges.contains_key(&key) {
            let edge = &mut self.project_edges[&key];
            edge.increment();
            return edge;
        }

        let id = self.allocate_id();
        self.project_edges
            .entry(key)
            .or_insert_with(|| DependencyEdge::new(id, EdgeLevel::Project, from, to, usage, None))
    }

    /// Looks up a project-level edge.
    pub fn project_edge(&self, key: &EdgeKey) -> Option<&DependencyEdge> {
        self.project_edges.get(key)
    }

    /// Looks up a project-level edge for update.
    pub fn project_edge_mut(&mut self, key: &EdgeKey) -> Option<&mut DependencyEdge> {
        self.project_edges.get_mut(key)
    }

    /// Project-level edges in first-seen order.
    pub fn project_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.project_edges.values()
    }

    /// Buffers `target` as referenced by `source_type`, declared in `owner`.
    pub fn record_type_reference(
        &mut self,
        source_type: &str,
        owner: Arc<ResourceIdentity>,
        target: impl Into<String>,
    ) {
        let target = target.into();
        match self.type_dependencies.get_mut(source_type) {
            Some(entry) => {
                entry.owner = owner;
                entry.targets.push(target);
            }
            None => {
                self.type_dependencies.insert(
                    source_type.to_string(),
                    TypeDependencies {
                        owner,
                        targets: vec![target],
                    },
                );
            }
        }
    }

    /// Buffered type references for one source type.
    pub fn type_dependencies(&self, source_type: &str) -> Option<&TypeDependencies> {
        self.type_dependencies.get(source_type)
    }

    /// Removes and returns the buffered type references for rollup.
    pub fn take_type_dependencies(&mut self) -> IndexMap<String, TypeDependencies> {
        std::mem::take(&mut self.type_dependencies)
    }

    /// Number of project-level edges.
    pub fn project_edge_count(&self) -> usize {
        self.project_edges.len()
    }

    /// Number of buffered `(source, target)` type references.
    pub fn type_reference_count(&self) -> usize {
        self.type_dependencies
            .values()
            .map(|deps| deps.targets.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::ResourceKey;

    fn module(name: &str) -> Arc<ResourceIdentity> {
        Arc::new(ResourceIdentity::ModuleNode {
            key: ResourceKey::module("acme", name),
            name: name.to_string(),
            parent_key: Some(ResourceKey::new("acme:Shop")),
        })
    }

    fn file(path: &str) -> Arc<ResourceIdentity> {
        Arc::new(ResourceIdentity::File {
            key: ResourceKey::new("acme:Core").child(path),
            path: path.to_string(),
            parent_key: ResourceKey::new("acme:Core:Model"),
        })
    }

    #[test]
    fn test_merge_increments_existing_edge() {
        let mut cache = DependencyCache::new();
        let core = module("Core");
        let lib = Arc::new(ResourceIdentity::library("log4net", "1.2"));

        let first_id = cache
            .merge_project_edge(core.clone(), lib.clone(), Usage::Compile)
            .id;
        let edge = cache.merge_project_edge(core.clone(), lib.clone(), Usage::Compile);
        assert_eq!(edge.id, first_id);
        assert_eq!(edge.weight, 2);
        assert_eq!(cache.project_edge_count(), 1);
    }

    #[test]
    fn test_direction_matters() {
        let mut cache = DependencyCache::new();
        let core = module("Core");
        let web = module("Web");
        cache.merge_project_edge(core.clone(), web.clone(), Usage::Compile);
        cache.merge_project_edge(web.clone(), core.clone(), Usage::Compile);
        assert_eq!(cache.project_edge_count(), 2);

        let key = EdgeKey::between(&web, &core);
        assert_eq!(cache.project_edge(&key).unwrap().weight, 1);
    }

    #[test]
    fn test_type_targets_accumulate_and_owner_is_replaced() {
        let mut cache = DependencyCache::new();
        let first_owner = file("Model/Order.cs");
        let second_owner = file("Model/OrderPartial.cs");

        cache.record_type_reference("Shop.Order", first_owner, "Shop.Customer");
        cache.record_type_reference("Shop.Order", second_owner.clone(), "Shop.Customer");
        cache.record_type_reference("Shop.Order", second_owner.clone(), "Shop.Address");

        let deps = cache.type_dependencies("Shop.Order").unwrap();
        assert!(Arc::ptr_eq(&deps.owner, &second_owner));
        assert_eq!(deps.targets, vec!["Shop.Customer", "Shop.Customer", "Shop.Address"]);
        assert_eq!(cache.type_reference_count(), 3);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut cache = DependencyCache::new();
        let a = cache.allocate_id();
        let b = cache.allocate_id();
        assert_ne!(a, b);

        let mut offset = DependencyCache::starting_at(EdgeId::new(40));
        assert_eq!(offset.allocate_id(), EdgeId::new(40));
    }
}
