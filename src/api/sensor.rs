//! Per-module orchestration of report analysis.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::engine::DependencyAnalyzer;
use crate::api::results::{AnalysisOutcome, AnalysisStats};
use crate::core::config::{DependencyConfig, ExecutionMode};
use crate::core::errors::Result;
use crate::core::resource::{ResourceIdentity, ResourceKey, ResourceTree, TypeBridge};
use crate::graph::sink::EdgeSink;

/// A module to analyze and the directory its report path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTarget {
    /// Module key in the resource tree
    pub key: ResourceKey,
    /// Base directory of the module
    pub base_dir: PathBuf,
}

/// A module whose report could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedModule {
    /// Module key
    pub project: ResourceKey,
    /// Report location that was tried
    pub report: String,
    /// Failure message
    pub reason: String,
}

/// Results of running the sensor over several modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorReport {
    /// One outcome per successfully analyzed module
    pub outcomes: Vec<AnalysisOutcome>,
    /// Modules whose report was missing or malformed
    pub skipped: Vec<SkippedModule>,
}

impl SensorReport {
    /// Counters summed over every outcome.
    pub fn totals(&self) -> AnalysisStats {
        let mut totals = AnalysisStats::default();
        for outcome in &self.outcomes {
            totals.accumulate(&outcome.stats);
        }
        totals
    }

    /// Number of diagnostics over every outcome.
    pub fn diagnostic_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.diagnostics.len()).sum()
    }
}

/// Runs the [`DependencyAnalyzer`] for the modules of a solution.
///
/// Each module gets its own run scope. A missing or malformed report only
/// skips its module; any other error aborts the whole run.
#[derive(Debug, Clone)]
pub struct DependencySensor {
    config: DependencyConfig,
    analyzer: DependencyAnalyzer,
}

impl DependencySensor {
    /// Create a sensor from dependency settings
    pub fn new(config: DependencyConfig) -> Result<Self> {
        let analyzer = DependencyAnalyzer::new(&config)?;
        Ok(Self { config, analyzer })
    }

    /// Settings in use.
    pub fn config(&self) -> &DependencyConfig {
        &self.config
    }

    /// False for the solution root and in skip mode.
    pub fn should_execute(&self, project: &ResourceIdentity) -> bool {
        if !project.is_module() || project.parent_key().is_none() {
            return false;
        }
        if self.config.mode == ExecutionMode::Skip {
            info!("Dependency analysis won't execute as it is set to 'skip' mode.");
            return false;
        }
        true
    }

    /// Report location for a module rooted at `base_dir`.
    pub fn report_path_for(&self, base_dir: &Path) -> PathBuf {
        self.config.report_path_for(base_dir)
    }

    /// Analyze one module's report.
    pub fn analyse(
        &self,
        module: &ModuleTarget,
        tree: &mut dyn ResourceTree,
        bridge: &dyn TypeBridge,
        sink: &mut dyn EdgeSink,
    ) -> Result<AnalysisOutcome> {
        let report = self.report_path_for(&module.base_dir);
        info!("Reusing dependency report: {}", report.display());
        self.analyzer
            .analyze_report(&module.key, &report, tree, bridge, sink)
    }

    /// Analyze every module in `modules`, in order.
    pub fn analyse_modules(
        &self,
        modules: &[ModuleTarget],
        tree: &mut dyn ResourceTree,
        bridge: &dyn TypeBridge,
        sink: &mut dyn EdgeSink,
    ) -> Result<SensorReport> {
        let mut report = SensorReport::default();

        for module in modules {
            let Some(node) = tree.resolve_module(&module.key) else {
                debug!("{} is not a module of the tree, skipping", module.key);
                continue;
            };
            if !self.should_execute(&node) {
                debug!("Dependency analysis not applicable to {}", module.key);
                continue;
            }

            match self.analyse(module, tree, bridge, sink) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(err) if err.is_report_failure() => {
                    let path = self.report_path_for(&module.base_dir);
                    warn!(
                        "Skipping dependencies of {}: {}",
                        node.display_name(),
                        err
                    );
                    report.skipped.push(SkippedModule {
                        project: module.key.clone(),
                        report: path.display().to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::ModuleDescriptor;
    use crate::core::tree::{InMemoryTree, TypeIndex};
    use crate::graph::sink::EdgeLog;
    use std::fs;
    use tempfile::TempDir;

    fn solution(root_dir: &Path) -> (InMemoryTree, Vec<ModuleTarget>) {
        let root = ResourceKey::new("acme:Shop");
        let mut tree = InMemoryTree::with_root(root.clone(), "Shop");
        let mut targets = Vec::new();
        for name in ["Core", "Web"] {
            let key = ResourceKey::module("acme", name);
            tree.create_module(ModuleDescriptor {
                key: key.clone(),
                name: name.to_string(),
                parent: Some(root.clone()),
            });
            let base_dir = root_dir.join(name);
            fs::create_dir_all(&base_dir).unwrap();
            targets.push(ModuleTarget { key, base_dir });
        }
        (tree, targets)
    }

    #[test]
    fn test_should_execute() {
        let sensor = DependencySensor::new(DependencyConfig::default()).unwrap();
        let root = ResourceIdentity::ModuleNode {
            key: ResourceKey::new("acme:Shop"),
            name: "Shop".to_string(),
            parent_key: None,
        };
        let module = ResourceIdentity::ModuleNode {
            key: ResourceKey::new("acme:Core"),
            name: "Core".to_string(),
            parent_key: Some(ResourceKey::new("acme:Shop")),
        };
        assert!(!sensor.should_execute(&root));
        assert!(sensor.should_execute(&module));

        let skipping = DependencySensor::new(DependencyConfig {
            mode: ExecutionMode::Skip,
            ..DependencyConfig::default()
        })
        .unwrap();
        assert!(!skipping.should_execute(&module));
    }

    #[test]
    fn test_missing_and_malformed_reports_are_skipped() {
        let dir = TempDir::new().unwrap();
        let (mut tree, targets) = solution(dir.path());
        fs::write(
            targets[0].base_dir.join("dependencyparser-report.xml"),
            r#"<Report><Assembly name="Core" version="1.0"><References>"#,
        )
        .unwrap();

        let sensor = DependencySensor::new(DependencyConfig::default()).unwrap();
        let mut sink = EdgeLog::new();
        let report = sensor
            .analyse_modules(&targets, &mut tree, &TypeIndex::new(), &mut sink)
            .unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].reason.contains("Malformed"));
        assert!(report.skipped[1].reason.contains("Cannot find"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_each_module_gets_its_own_run() {
        let dir = TempDir::new().unwrap();
        let (mut tree, targets) = solution(dir.path());
        let body = |name: &str| {
            format!(
                r#"<Report>
  <Assembly name="{name}" version="1.0">
    <References><Reference name="log4net" version="1.2"/></References>
  </Assembly>
  <Assembly name="Core" version="1.0">
    <References><Reference name="NUnit" version="2.6"/></References>
  </Assembly>
</Report>"#
            )
        };
        for target in &targets {
            let name = target.key.as_str().trim_start_matches("acme:").to_string();
            fs::write(target.base_dir.join("dependencyparser-report.xml"), body(&name)).unwrap();
        }

        let sensor = DependencySensor::new(DependencyConfig::default()).unwrap();
        let mut sink = EdgeLog::new();
        let report = sensor
            .analyse_modules(&targets, &mut tree, &TypeIndex::new(), &mut sink)
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        // Core's report: both assemblies are Core, so the edges merge into one run.
        assert_eq!(report.outcomes[0].stats.project_edges, 2);
        // Web's report: the Core block belongs to another project.
        assert_eq!(report.outcomes[1].stats.project_edges, 1);
        assert_eq!(report.outcomes[1].stats.skipped_assemblies, 1);
        assert_eq!(report.totals().project_edges, 3);
        assert_eq!(sink.len(), 3);
    }
}
