//! Configuration types and management for clrdeps.
//!
//! Configuration is loaded from YAML and can be overridden with flat
//! `key=value` properties. Property keys from older releases are still
//! honoured through an alias table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::errors::{ClrdepsError, Result};

/// Default report file name, relative to a module's base directory.
pub const DEFAULT_REPORT_FILE: &str = "dependencyparser-report.xml";

/// Default report text encoding.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Main configuration for clrdeps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClrdepsConfig {
    /// Dependency report ingestion settings
    #[serde(default)]
    pub dependency: DependencyConfig,

    /// Logging settings used by the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Whether the dependency sensor runs at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Read an existing report
    #[default]
    #[serde(alias = "reuseReport", alias = "reuse_report")]
    Reuse,
    /// Do not analyze dependencies
    Skip,
}

impl ExecutionMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reuse" | "reusereport" | "reuse_report" => Some(Self::Reuse),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Dependency report ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Execution mode
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Report location; relative paths are resolved against each module's base directory
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Text encoding used to open the report
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Buffer `TypeReferences` and roll them up to folder and file edges.
    /// When disabled only assembly-level `References` are read.
    #[serde(default = "default_type_rollup")]
    pub type_rollup: bool,
}

fn default_report_path() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_FILE)
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_type_rollup() -> bool {
    true
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            report_path: default_report_path(),
            encoding: default_encoding(),
            type_rollup: default_type_rollup(),
        }
    }
}

impl DependencyConfig {
    /// Resolves the report location for a module rooted at `base_dir`.
    pub fn report_path_for(&self, base_dir: &Path) -> PathBuf {
        if self.report_path.is_absolute() {
            self.report_path.clone()
        } else {
            base_dir.join(&self.report_path)
        }
    }

    /// Validate dependency settings
    pub fn validate(&self) -> Result<()> {
        if self.report_path.as_os_str().is_empty() {
            return Err(ClrdepsError::config_field(
                "report_path must not be empty",
                "dependency.report_path",
            ));
        }

        if encoding_rs::Encoding::for_label(self.encoding.trim().as_bytes()).is_none() {
            return Err(ClrdepsError::config_field(
                format!("Unknown encoding label: {}", self.encoding),
                "dependency.encoding",
            ));
        }

        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter (`RUST_LOG` takes precedence)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Canonical property keys and the legacy keys that used to carry the same value.
const PROPERTY_ALIASES: &[(&str, &[&str])] = &[
    ("dependency.mode", &["dependencyparser.mode"]),
    ("dependency.report_path", &["dependencyparser.reportsPath"]),
    ("dependency.encoding", &["sourceEncoding"]),
    ("dependency.type_rollup", &[]),
    ("logging.level", &[]),
];

impl ClrdepsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ClrdepsError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            ClrdepsError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.dependency.validate()?;

        if tracing_level(&self.logging.level).is_none() {
            return Err(ClrdepsError::config_field(
                format!("Unknown log level: {}", self.logging.level),
                "logging.level",
            ));
        }

        Ok(())
    }

    /// Applies flat `key=value` overrides.
    ///
    /// For every canonical key a non-blank legacy alias wins over the
    /// canonical entry. Keys that are neither canonical nor legacy are rejected.
    pub fn apply_properties(&mut self, properties: &HashMap<String, String>) -> Result<()> {
        for key in properties.keys() {
            let known = PROPERTY_ALIASES
                .iter()
                .any(|(canonical, legacy)| *canonical == key.as_str() || legacy.contains(&key.as_str()));
            if !known {
                return Err(ClrdepsError::config_field(
                    format!("Unknown property: {key}"),
                    key.clone(),
                ));
            }
        }

        for (canonical, legacy) in PROPERTY_ALIASES {
            let previous = legacy.iter().find_map(|old| {
                properties
                    .get(*old)
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (*old, value))
            });

            let value = match previous {
                Some((old, value)) => {
                    info!(
                        "Using deprecated property '{}', use '{}' instead",
                        old, canonical
                    );
                    value
                }
                None => match properties.get(*canonical) {
                    Some(value) => value,
                    None => continue,
                },
            };

            self.set_property(canonical, value)?;
        }

        Ok(())
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "dependency.mode" => {
                self.dependency.mode = ExecutionMode::parse(value).ok_or_else(|| {
                    ClrdepsError::config_field(format!("Unknown mode: {value}"), key)
                })?;
            }
            "dependency.report_path" => self.dependency.report_path = PathBuf::from(value.trim()),
            "dependency.encoding" => self.dependency.encoding = value.trim().to_string(),
            "dependency.type_rollup" => {
                self.dependency.type_rollup = value.trim().parse::<bool>().map_err(|_| {
                    ClrdepsError::config_field(format!("Expected true or false, got {value}"), key)
                })?;
            }
            "logging.level" => self.logging.level = value.trim().to_string(),
            _ => {
                return Err(ClrdepsError::config_field(
                    format!("Unknown property: {key}"),
                    key,
                ))
            }
        }
        Ok(())
    }
}

/// Parses a log level name.
pub fn tracing_level(level: &str) -> Option<tracing::Level> {
    level.trim().parse::<tracing::Level>().ok()
}
