//! Resource identities and the collaborator traits the dependency pipeline
//! resolves names against.
//!
//! A [`ResourceIdentity`] is anything that can be the endpoint of a
//! dependency edge. Identities are shared as `Arc<ResourceIdentity>` so that
//! two lookups of the same name within one run hand back the same allocation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = ':';

/// Stable, string-backed key of a node in the resource tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Wraps a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key of a module named `name` under the tree whose base key is `base`.
    ///
    /// Whitespace is removed from the name, so `"My Project"` and
    /// `"MyProject"` map to the same module.
    pub fn module(base: &str, name: &str) -> Self {
        let stripped: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        Self(format!("{base}{KEY_SEPARATOR}{stripped}"))
    }

    /// Key of an external library. Distinct versions are distinct keys.
    pub fn library(name: &str, version: &str) -> Self {
        Self(format!("lib{KEY_SEPARATOR}{name}{KEY_SEPARATOR}{version}"))
    }

    /// Key of a child resource (directory or file) of `self`.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}{KEY_SEPARATOR}{}", self.0, segment))
    }

    /// The tree's base key: everything before the first separator.
    pub fn base(&self) -> &str {
        self.0
            .split_once(KEY_SEPARATOR)
            .map_or(self.0.as_str(), |(base, _)| base)
    }

    /// Returns the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Coarse classification of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// The solution root or one of its modules
    Module,
    /// A folder inside a module
    Directory,
    /// A source file
    File,
    /// A binary outside the analyzed tree
    Library,
}

/// Endpoint of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceIdentity {
    /// A project/sub-module that already exists in the resource tree.
    /// The solution root is a module without a parent.
    ModuleNode {
        /// Module key
        key: ResourceKey,
        /// Display name
        name: String,
        /// Enclosing module, `None` for the root
        parent_key: Option<ResourceKey>,
    },
    /// A folder owned by a module.
    Directory {
        /// Directory key
        key: ResourceKey,
        /// Path relative to the module
        path: String,
        /// Owning module
        parent_key: ResourceKey,
    },
    /// A source file owned by a directory.
    File {
        /// File key
        key: ResourceKey,
        /// Path relative to the module
        path: String,
        /// Owning directory
        parent_key: ResourceKey,
    },
    /// A binary dependency that is not part of the analyzed tree.
    ExternalLibrary {
        /// Library key, derived from name and version
        key: ResourceKey,
        /// Assembly name
        name: String,
        /// Assembly version
        version: String,
    },
}

impl ResourceIdentity {
    /// Builds an external library identity.
    pub fn library(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        Self::ExternalLibrary {
            key: ResourceKey::library(&name, &version),
            name,
            version,
        }
    }

    /// The resource key.
    pub fn key(&self) -> &ResourceKey {
        match self {
            Self::ModuleNode { key, .. }
            | Self::Directory { key, .. }
            | Self::File { key, .. }
            | Self::ExternalLibrary { key, .. } => key,
        }
    }

    /// Key of the owning resource, if any.
    pub fn parent_key(&self) -> Option<&ResourceKey> {
        match self {
            Self::ModuleNode { parent_key, .. } => parent_key.as_ref(),
            Self::Directory { parent_key, .. } | Self::File { parent_key, .. } => Some(parent_key),
            Self::ExternalLibrary { .. } => None,
        }
    }

    /// Resource qualifier.
    pub fn qualifier(&self) -> Qualifier {
        match self {
            Self::ModuleNode { .. } => Qualifier::Module,
            Self::Directory { .. } => Qualifier::Directory,
            Self::File { .. } => Qualifier::File,
            Self::ExternalLibrary { .. } => Qualifier::Library,
        }
    }

    /// Human readable name used in log lines.
    pub fn display_name(&self) -> String {
        match self {
            Self::ModuleNode { name, .. } => format!("Project {name}"),
            Self::Directory { path, .. } | Self::File { path, .. } => path.clone(),
            Self::ExternalLibrary { name, version, .. } => format!("{name} {version}"),
        }
    }

    /// True for project/sub-module nodes.
    pub fn is_module(&self) -> bool {
        matches!(self, Self::ModuleNode { .. })
    }
}

/// A type resolved through the [`TypeBridge`] to the file declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    /// Fully qualified type name as written in the report
    pub fully_qualified_name: String,
    /// File resource declaring the type
    pub file: Arc<ResourceIdentity>,
}

/// Description of a module to materialize in a [`ResourceTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Module key
    pub key: ResourceKey,
    /// Display name
    pub name: String,
    /// Enclosing module, `None` for the root
    pub parent: Option<ResourceKey>,
}

/// The externally owned resource tree.
///
/// Creation operations are get-or-create: implementations must probe for an
/// existing node by key first and return it instead of creating a duplicate.
pub trait ResourceTree {
    /// Looks up a module (project) by key.
    fn resolve_module(&self, key: &ResourceKey) -> Option<Arc<ResourceIdentity>>;

    /// Materializes a module, returning the existing one when the key is taken.
    fn create_module(&mut self, descriptor: ModuleDescriptor) -> Arc<ResourceIdentity>;

    /// Returns the library node for `(name, version)`, creating it on first use.
    fn create_or_reuse_library(&mut self, name: &str, version: &str) -> Arc<ResourceIdentity>;

    /// Returns the owning resource of `resource`.
    fn parent(&self, resource: &ResourceIdentity) -> Option<Arc<ResourceIdentity>>;
}

/// Maps a fully qualified type name to the file resource that declares it.
pub trait TypeBridge {
    /// Returns `None` for types outside the analyzed sources.
    fn resolve_type_owner(&self, fully_qualified_name: &str) -> Option<Arc<ResourceIdentity>>;
}
