//! Solution manifests: a declarative description of the analyzed tree.
//!
//! ```yaml
//! solution:
//!   key: "acme:Shop"
//!   name: Shop
//! modules:
//!   - name: Shop.Core
//!     base_dir: src/Core
//!     folders:
//!       - path: Model
//!         files:
//!           - name: Order.cs
//!             types: [Shop.Core.Order, Shop.Core.OrderLine]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::sensor::ModuleTarget;
use crate::core::errors::{ClrdepsError, Result, ResultExt};
use crate::core::resource::{ModuleDescriptor, ResourceKey, ResourceTree};
use crate::core::tree::{InMemoryTree, TypeIndex};

/// Root of a manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionManifest {
    /// The solution (tree root)
    pub solution: SolutionEntry,

    /// Modules of the solution
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// Solution root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionEntry {
    /// Solution key, `group:Solution`
    pub key: String,

    /// Display name; defaults to the part after the first `:`
    #[serde(default)]
    pub name: Option<String>,
}

/// One module (project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Module name as it appears in reports
    pub name: String,

    /// Directory of the module, relative to the manifest; defaults to the name
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Source folders
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
}

/// A folder inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Path relative to the module
    pub path: String,

    /// Files in the folder
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A source file and the types it declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name
    pub name: String,

    /// Fully qualified names of the declared types
    #[serde(default)]
    pub types: Vec<String>,
}

impl SolutionManifest {
    /// Load a manifest, choosing YAML or JSON by file extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let manifest: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") | None => serde_yaml::from_str(&content)?,
            Some(other) => {
                return Err(ClrdepsError::config_field(
                    format!("Unsupported manifest format: .{other}"),
                    "manifest",
                ))
            }
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Check keys and names before building.
    pub fn validate(&self) -> Result<()> {
        if self.solution.key.trim().is_empty() {
            return Err(ClrdepsError::validation_field(
                "Solution key must not be empty",
                "solution.key",
            ));
        }

        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(ClrdepsError::validation_field(
                    "Module name must not be empty",
                    "modules.name",
                ));
            }
            let key = self.module_key(&module.name);
            if !seen.insert(key.clone()) {
                return Err(ClrdepsError::validation_field(
                    format!("Duplicate module key {key}"),
                    "modules.name",
                ));
            }
        }

        Ok(())
    }

    /// Key of the solution root.
    pub fn solution_key(&self) -> ResourceKey {
        ResourceKey::new(self.solution.key.trim())
    }

    /// Key a module named `name` gets in the tree.
    pub fn module_key(&self, name: &str) -> ResourceKey {
        ResourceKey::module(self.solution_key().base(), name)
    }

    /// Materialize the resource tree and the type index.
    pub fn build(&self) -> Result<(InMemoryTree, TypeIndex)> {
        let root = self.solution_key();
        let root_name = self.solution.name.clone().unwrap_or_else(|| {
            root.as_str()
                .split_once(':')
                .map_or_else(|| root.to_string(), |(_, name)| name.to_string())
        });

        let mut tree = InMemoryTree::with_root(root.clone(), root_name);
        let mut index = TypeIndex::new();

        for module in &self.modules {
            let node = tree.create_module(ModuleDescriptor {
                key: self.module_key(&module.name),
                name: module.name.clone(),
                parent: Some(root.clone()),
            });
            for folder in &module.folders {
                let dir = tree.add_directory(node.key(), &folder.path)?;
                for file in &folder.files {
                    let file_node = tree.add_file(dir.key(), &file.name)?;
                    for type_name in &file.types {
                        index.insert(type_name.clone(), file_node.clone());
                    }
                }
            }
        }

        debug!(
            "Built resource tree with {} nodes and {} indexed types",
            tree.len(),
            index.len()
        );
        Ok((tree, index))
    }

    /// Modules with their base directories resolved against `manifest_dir`.
    pub fn module_targets(&self, manifest_dir: &Path) -> Vec<ModuleTarget> {
        self.modules
            .iter()
            .map(|module| ModuleTarget {
                key: self.module_key(&module.name),
                base_dir: manifest_dir.join(
                    module
                        .base_dir
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(&module.name)),
                ),
            })
            .collect()
    }

    /// Finds a module by report name or key.
    pub fn find_module(&self, name_or_key: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|module| {
            module.name == name_or_key || self.module_key(&module.name).as_str() == name_or_key
        })
    }
}
