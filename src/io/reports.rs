//! Serialized analysis output.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::results::{AnalysisOutcome, AnalysisStats, EdgeRecord};
use crate::api::sensor::{SensorReport, SkippedModule};
use crate::core::errors::{ClrdepsError, Result};
use crate::core::resource::ResourceKey;
use crate::graph::sink::EdgeLog;

/// Output serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Everything one invocation produced: per-module outcomes and the edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Solution root key
    pub solution: ResourceKey,

    /// Version of the tool that wrote the report
    pub tool_version: String,

    /// Counters summed over every analyzed module
    pub totals: AnalysisStats,

    /// One entry per analyzed module
    pub outcomes: Vec<AnalysisOutcome>,

    /// Modules whose report was missing or malformed
    #[serde(default)]
    pub skipped: Vec<SkippedModule>,

    /// Final edges in the order they were first recorded
    pub edges: Vec<EdgeRecord>,
}

impl DependencyReport {
    /// Assemble a report from the sensor results and the edge sink.
    pub fn new(solution: ResourceKey, sensor: SensorReport, edges: &EdgeLog) -> Self {
        Self {
            solution,
            tool_version: crate::VERSION.to_string(),
            totals: sensor.totals(),
            outcomes: sensor.outcomes,
            skipped: sensor.skipped,
            edges: edges.edges().map(EdgeRecord::from).collect(),
        }
    }

    /// Serialize in the given format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(rendered)
    }

    /// Write the report to `path`.
    pub fn write_to(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let rendered = self.render(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                ClrdepsError::io(format!("Failed to create {}", parent.display()), err)
            })?;
        }
        fs::write(path, rendered)
            .map_err(|err| ClrdepsError::io(format!("Failed to write {}", path.display()), err))
    }
}
