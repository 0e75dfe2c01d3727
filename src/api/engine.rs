//! Main analysis engine implementation.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::results::{AnalysisOutcome, AnalysisStats};
use crate::core::config::DependencyConfig;
use crate::core::errors::{ClrdepsError, Result};
use crate::core::resource::{ResourceIdentity, ResourceKey, ResourceTree, TypeBridge};
use crate::graph::builder::{BuildStats, GraphBuilder};
use crate::graph::rollup::roll_up;
use crate::graph::run::RunScope;
use crate::graph::sink::EdgeSink;
use crate::report::reader::ReportReader;
use crate::report::XmlStream;

/// Turns dependency reports into edges for one project at a time.
///
/// Every call opens a fresh [`RunScope`], so nothing learned from one report
/// leaks into the next. Edges reach `sink` only when the report was parsed
/// and rolled up completely.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyAnalyzer {
    reader: ReportReader,
    builder: GraphBuilder,
}

impl DependencyAnalyzer {
    /// Create an analyzer from validated dependency settings
    pub fn new(config: &DependencyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: ReportReader::new(&config.encoding)?,
            builder: GraphBuilder::new(config.type_rollup),
        })
    }

    /// Encoding used to open reports.
    pub fn encoding_name(&self) -> &'static str {
        self.reader.encoding_name()
    }

    /// Analyze the report at `report` for `project`.
    pub fn analyze_report(
        &self,
        project: &ResourceKey,
        report: &Path,
        tree: &mut dyn ResourceTree,
        bridge: &dyn TypeBridge,
        sink: &mut dyn EdgeSink,
    ) -> Result<AnalysisOutcome> {
        let project_node = Self::project_node(project, tree)?;
        info!(
            "Analyzing dependency report {} for {}",
            report.display(),
            project_node.display_name()
        );

        let mut run = RunScope::starting_at(project_node, sink.next_edge_id());
        let build = self
            .reader
            .read(report, |stream| self.builder.build(stream, &mut run, &mut *tree, bridge))?;

        Ok(Self::finish(run, build, report.display().to_string(), tree, bridge, sink))
    }

    /// Analyze a report supplied as a byte stream. `source` labels errors and the outcome.
    pub fn analyze_stream<R: Read>(
        &self,
        project: &ResourceKey,
        input: R,
        source: &str,
        tree: &mut dyn ResourceTree,
        bridge: &dyn TypeBridge,
        sink: &mut dyn EdgeSink,
    ) -> Result<AnalysisOutcome> {
        let project_node = Self::project_node(project, tree)?;
        let mut run = RunScope::starting_at(project_node, sink.next_edge_id());
        let mut stream: XmlStream<_> = self.reader.stream(input, source);
        let build = self.builder.build(&mut stream, &mut run, tree, bridge)?;

        Ok(Self::finish(run, build, source.to_string(), tree, bridge, sink))
    }

    fn project_node(
        project: &ResourceKey,
        tree: &dyn ResourceTree,
    ) -> Result<Arc<ResourceIdentity>> {
        tree.resolve_module(project).ok_or_else(|| {
            ClrdepsError::validation_field(
                format!("Project {project} is not a module of the resource tree"),
                "project",
            )
        })
    }

    fn finish(
        mut run: RunScope,
        build: BuildStats,
        report: String,
        tree: &dyn ResourceTree,
        bridge: &dyn TypeBridge,
        sink: &mut dyn EdgeSink,
    ) -> AnalysisOutcome {
        let rollup = roll_up(&mut run, tree, bridge);
        let project = run.project().key().clone();
        let (diagnostics, records) = run.commit(sink);

        let stats = AnalysisStats::from_run(build, rollup, records);
        debug!(
            "Committed {} edge records for {} ({} diagnostics)",
            records,
            project,
            diagnostics.len()
        );

        AnalysisOutcome {
            project,
            report,
            stats,
            diagnostics: diagnostics.into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ExecutionMode;
    use crate::core::resource::ModuleDescriptor;
    use crate::core::tree::{InMemoryTree, TypeIndex};
    use crate::graph::sink::EdgeLog;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tree() -> InMemoryTree {
        let root = ResourceKey::new("acme:Shop");
        let mut tree = InMemoryTree::with_root(root.clone(), "Shop");
        tree.create_module(ModuleDescriptor {
            key: ResourceKey::new("acme:Core"),
            name: "Core".to_string(),
            parent: Some(root),
        });
        tree
    }

    #[test]
    fn test_analyze_report_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<Report><Assembly name="Core" version="1.0"><References>
                <Reference name="log4net" version="1.2"/>
            </References></Assembly></Report>"#
        )
        .unwrap();

        let analyzer = DependencyAnalyzer::default();
        let mut tree = tree();
        let mut sink = EdgeLog::new();
        let outcome = analyzer
            .analyze_report(
                &ResourceKey::new("acme:Core"),
                file.path(),
                &mut tree,
                &TypeIndex::new(),
                &mut sink,
            )
            .unwrap();

        assert_eq!(outcome.stats.assemblies, 1);
        assert_eq!(outcome.stats.project_edges, 1);
        assert!(outcome.is_clean());
        assert_eq!(sink.len(), 1);
        assert!(tree
            .get(&ResourceKey::library("log4net", "1.2"))
            .is_some());
    }

    #[test]
    fn test_unknown_project_is_rejected() {
        let analyzer = DependencyAnalyzer::default();
        let mut tree = tree();
        let err = analyzer
            .analyze_stream(
                &ResourceKey::new("acme:Missing"),
                "<Report/>".as_bytes(),
                "inline",
                &mut tree,
                &TypeIndex::new(),
                &mut EdgeLog::new(),
            )
            .unwrap_err();
        assert!(matches!(err, ClrdepsError::Validation { .. }));
    }

    #[test]
    fn test_failed_report_commits_nothing() {
        let analyzer = DependencyAnalyzer::default();
        let mut tree = tree();
        let mut sink = EdgeLog::new();
        let err = analyzer
            .analyze_stream(
                &ResourceKey::new("acme:Core"),
                r#"<Report><Assembly name="Core" version="1.0"><References>
                    <Reference name="log4net" version="1.2"/>"#
                    .as_bytes(),
                "inline",
                &mut tree,
                &TypeIndex::new(),
                &mut sink,
            )
            .unwrap_err();
        assert!(err.is_report_failure());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_new_validates_config() {
        let config = DependencyConfig {
            mode: ExecutionMode::Reuse,
            encoding: "klingon".to_string(),
            ..DependencyConfig::default()
        };
        assert!(DependencyAnalyzer::new(&config).is_err());

        let latin = DependencyConfig {
            encoding: "latin1".to_string(),
            ..DependencyConfig::default()
        };
        assert_eq!(
            DependencyAnalyzer::new(&latin).unwrap().encoding_name(),
            "windows-1252"
        );
    }
}
