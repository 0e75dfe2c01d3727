//! Maps report names to resource identities.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::resource::{ResourceIdentity, ResourceKey, ResourceTree, TypeBridge};

/// Upper bound on the ancestry walk when checking module containment.
const MAX_ANCESTRY_DEPTH: usize = 64;

/// Resolves `(name, version)` pairs and type names for one project under analysis.
///
/// Results are memoized for the lifetime of the resolver, so the same input
/// always yields the same `Arc` within a run.
#[derive(Debug)]
pub struct IdentityResolver {
    project: Arc<ResourceIdentity>,
    scope: ResourceKey,
    assemblies: HashMap<(String, String), Arc<ResourceIdentity>>,
    types: HashMap<String, Option<Arc<ResourceIdentity>>>,
}

impl IdentityResolver {
    /// Creates a resolver for `project`. Modules are looked up among the
    /// descendants of the project's parent (the project itself when it is a root).
    pub fn new(project: Arc<ResourceIdentity>) -> Self {
        let scope = project
            .parent_key()
            .unwrap_or_else(|| project.key())
            .clone();
        Self {
            project,
            scope,
            assemblies: HashMap::new(),
            types: HashMap::new(),
        }
    }

    /// The project under analysis.
    pub fn project(&self) -> &Arc<ResourceIdentity> {
        &self.project
    }

    /// Resolves an assembly to an in-tree module, or to an external library
    /// created on first use.
    pub fn resolve(
        &mut self,
        name: &str,
        version: &str,
        tree: &mut dyn ResourceTree,
    ) -> Arc<ResourceIdentity> {
        let memo_key = (name.to_string(), version.to_string());
        if let Some(identity) = self.assemblies.get(&memo_key) {
            return identity.clone();
        }

        let candidate = ResourceKey::module(self.scope.base(), name);
        let identity = match tree.resolve_module(&candidate) {
            Some(module) if self.is_in_scope(&module, tree) => module,
            Some(module) => {
                debug!(
                    "Module {} is outside {}, treating {} {} as a library",
                    module.key(),
                    self.scope,
                    name,
                    version
                );
                tree.create_or_reuse_library(name, version)
            }
            None => tree.create_or_reuse_library(name, version),
        };

        self.assemblies.insert(memo_key, identity.clone());
        identity
    }

    /// Resolves a fully qualified type name to its declaring file.
    pub fn resolve_type(
        &mut self,
        fully_qualified_name: &str,
        bridge: &dyn TypeBridge,
    ) -> Option<Arc<ResourceIdentity>> {
        if let Some(cached) = self.types.get(fully_qualified_name) {
            return cached.clone();
        }
        let owner = bridge.resolve_type_owner(fully_qualified_name);
        self.types
            .insert(fully_qualified_name.to_string(), owner.clone());
        owner
    }

    /// True when `identity` is a module other than the project under analysis.
    pub fn is_foreign_module(&self, identity: &ResourceIdentity) -> bool {
        identity.is_module() && identity.key() != self.project.key()
    }

    fn is_in_scope(&self, module: &ResourceIdentity, tree: &dyn ResourceTree) -> bool {
        let mut parent_key = module.parent_key().cloned();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            let Some(key) = parent_key else {
                return false;
            };
            if key == self.scope {
                return true;
            }
            parent_key = tree
                .resolve_module(&key)
                .and_then(|parent| parent.parent_key().cloned());
        }
        false
    }
}
