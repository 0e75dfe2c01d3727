//! CLI Argument Structures
//!
//! Command and argument definitions for the clrdeps binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use clrdeps::OutputFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dependency graphs from .NET dependency reports
#[derive(Parser)]
#[command(name = "clrdeps")]
#[command(version = VERSION)]
#[command(about = "Build project, folder and file dependency graphs from dependency-parser reports")]
#[command(long_about = "
Read the XML report a dependency-parser tool wrote for a solution's assemblies
and turn it into project, folder and file level dependency edges.

Common Usage:

  # Analyze every module of a solution (report path from configuration)
  clrdeps analyze --manifest solution.yaml

  # Analyze one module with an explicit report
  clrdeps analyze --manifest solution.yaml --project Shop.Core --report out/deps.xml

  # Reports written in a legacy code page
  clrdeps analyze --manifest solution.yaml --encoding windows-1252

  # Only assembly-level references
  clrdeps analyze --manifest solution.yaml --no-type-rollup --format yaml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze dependency reports for the modules of a solution
    Analyze(Box<AnalyzeArgs>),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a clrdeps configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Solution manifest (YAML or JSON) describing modules, folders, files and types
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Report file. With --project, the report to analyze; otherwise the
    /// report path used for every module, relative to each module's directory
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Analyze only this module (name or key)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Text encoding of the report (WHATWG label)
    #[arg(long, env = "CLRDEPS_ENCODING")]
    pub encoding: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override a configuration property (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Only read assembly references; ignore type references
    #[arg(long)]
    pub no_type_rollup: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: FormatArg,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,

    /// Property overrides to validate along with the file
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
