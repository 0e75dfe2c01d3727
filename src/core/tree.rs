//! In-memory implementations of the resource tree and the type bridge.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::errors::{ClrdepsError, Result};
use crate::core::resource::{
    ModuleDescriptor, ResourceIdentity, ResourceKey, TypeBridge, ResourceTree,
};

/// Resource tree held in memory, keyed by [`ResourceKey`].
///
/// Nodes are interned: every lookup of a key returns the same `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryTree {
    nodes: IndexMap<ResourceKey, Arc<ResourceIdentity>>,
}

impl InMemoryTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree containing only the solution root.
    pub fn with_root(key: ResourceKey, name: impl Into<String>) -> Self {
        let mut tree = Self::new();
        tree.create_module(ModuleDescriptor {
            key,
            name: name.into(),
            parent: None,
        });
        tree
    }

    /// Looks up any node by key.
    pub fn get(&self, key: &ResourceKey) -> Option<Arc<ResourceIdentity>> {
        self.nodes.get(key).cloned()
    }

    /// Adds (or returns) a directory under `module`.
    pub fn add_directory(&mut self, module: &ResourceKey, path: &str) -> Result<Arc<ResourceIdentity>> {
        self.require(module, "module")?;
        let key = module.child(path);
        Ok(self.intern(ResourceIdentity::Directory {
            key,
            path: path.to_string(),
            parent_key: module.clone(),
        }))
    }

    /// Adds (or returns) a file under `directory`.
    pub fn add_file(&mut self, directory: &ResourceKey, file_name: &str) -> Result<Arc<ResourceIdentity>> {
        let parent = self.require(directory, "directory")?;
        let ResourceIdentity::Directory {
            path: dir_path,
            parent_key: module_key,
            ..
        } = parent.as_ref()
        else {
            return Err(ClrdepsError::validation_field(
                format!("{directory} is not a directory"),
                "directory",
            ));
        };

        let path = format!("{dir_path}/{file_name}");
        Ok(self.intern(ResourceIdentity::File {
            key: module_key.child(&path),
            path,
            parent_key: directory.clone(),
        }))
    }

    /// Modules whose parent is `parent`.
    pub fn modules_under(&self, parent: &ResourceKey) -> Vec<Arc<ResourceIdentity>> {
        self.nodes
            .values()
            .filter(|node| node.is_module() && node.parent_key() == Some(parent))
            .cloned()
            .collect()
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn require(&self, key: &ResourceKey, what: &str) -> Result<Arc<ResourceIdentity>> {
        self.get(key).ok_or_else(|| {
            ClrdepsError::validation_field(format!("Unknown {what}: {key}"), what.to_string())
        })
    }

    fn intern(&mut self, identity: ResourceIdentity) -> Arc<ResourceIdentity> {
        self.nodes
            .entry(identity.key().clone())
            .or_insert_with(|| Arc::new(identity))
            .clone()
    }
}

impl ResourceTree for InMemoryTree {
    fn resolve_module(&self, key: &ResourceKey) -> Option<Arc<ResourceIdentity>> {
        self.nodes.get(key).filter(|node| node.is_module()).cloned()
    }

    fn create_module(&mut self, descriptor: ModuleDescriptor) -> Arc<ResourceIdentity> {
        self.intern(ResourceIdentity::ModuleNode {
            key: descriptor.key,
            name: descriptor.name,
            parent_key: descriptor.parent,
        })
    }

    fn create_or_reuse_library(&mut self, name: &str, version: &str) -> Arc<ResourceIdentity> {
        let key = ResourceKey::library(name, version);
        if let Some(existing) = self.nodes.get(&key) {
            return existing.clone();
        }
        debug!("Indexing library {} {}", name, version);
        self.intern(ResourceIdentity::library(name, version))
    }

    fn parent(&self, resource: &ResourceIdentity) -> Option<Arc<ResourceIdentity>> {
        resource.parent_key().and_then(|key| self.get(key))
    }
}

/// Type-name index backing the [`TypeBridge`].
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    owners: HashMap<String, Arc<ResourceIdentity>>,
}

impl TypeIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `type_name` as declared in `file`. Later registrations win.
    pub fn insert(&mut self, type_name: impl Into<String>, file: Arc<ResourceIdentity>) {
        self.owners.insert(type_name.into(), file);
    }

    /// Number of indexed types.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no type is indexed.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl TypeBridge for TypeIndex {
    fn resolve_type_owner(&self, fully_qualified_name: &str) -> Option<Arc<ResourceIdentity>> {
        self.owners.get(fully_qualified_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> InMemoryTree {
        let mut tree = InMemoryTree::with_root(ResourceKey::new("acme:Shop"), "Shop");
        tree.create_module(ModuleDescriptor {
            key: ResourceKey::new("acme:Core"),
            name: "Core".to_string(),
            parent: Some(ResourceKey::new("acme:Shop")),
        });
        tree
    }

    #[test]
    fn test_library_get_or_create_is_idempotent() {
        let mut tree = solution();
        let first = tree.create_or_reuse_library("NHibernate", "3.0");
        let second = tree.create_or_reuse_library("NHibernate", "3.0");
        assert!(Arc::ptr_eq(&first, &second));

        let other = tree.create_or_reuse_library("NHibernate", "3.1");
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_file_parent_chain() {
        let mut tree = solution();
        let core = ResourceKey::new("acme:Core");
        let dir = tree.add_directory(&core, "Model").unwrap();
        let file = tree.add_file(dir.key(), "Order.cs").unwrap();

        assert_eq!(file.key().as_str(), "acme:Core:Model/Order.cs");
        let folder = tree.parent(&file).unwrap();
        assert!(Arc::ptr_eq(&folder, &dir));
        let project = tree.parent(&folder).unwrap();
        assert_eq!(project.key(), &core);
    }

    #[test]
    fn test_resolve_module_ignores_non_modules() {
        let mut tree = solution();
        let dir = tree
            .add_directory(&ResourceKey::new("acme:Core"), "Model")
            .unwrap();
        assert!(tree.resolve_module(dir.key()).is_none());
        assert!(tree.resolve_module(&ResourceKey::new("acme:Core")).is_some());
    }

    #[test]
    fn test_add_file_requires_directory() {
        let mut tree = solution();
        let err = tree
            .add_file(&ResourceKey::new("acme:Core"), "Program.cs")
            .unwrap_err();
        assert!(matches!(err, ClrdepsError::Validation { .. }));
    }

    #[test]
    fn test_modules_under_root() {
        let tree = solution();
        let modules = tree.modules_under(&ResourceKey::new("acme:Shop"));
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].key().as_str(), "acme:Core");
    }
}
