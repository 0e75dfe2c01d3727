//! Command execution for the clrdeps binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use clrdeps::api::sensor::ModuleTarget;
use clrdeps::{
    ClrdepsConfig, DependencyReport, DependencySensor, EdgeLog, InMemoryTree, OutputFormat,
    ResourceTree, SensorReport, SolutionManifest, TypeIndex,
};

use super::args::{AnalyzeArgs, ValidateConfigArgs};
use super::output::{display_config_summary, display_run_summary};

/// Load configuration from `path` (or defaults) and apply property overrides.
pub fn load_configuration(
    path: Option<&Path>,
    overrides: &[(String, String)],
) -> anyhow::Result<ClrdepsConfig> {
    let mut config = match path {
        Some(path) => ClrdepsConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClrdepsConfig::default(),
    };

    if !overrides.is_empty() {
        let properties: HashMap<String, String> = overrides.iter().cloned().collect();
        config.apply_properties(&properties)?;
    }

    config.validate()?;
    Ok(config)
}

/// Analyze the dependency reports of a solution's modules.
pub fn analyze_command(args: Box<AnalyzeArgs>) -> anyhow::Result<()> {
    let mut config = load_configuration(args.config.as_deref(), &args.properties)?;
    if let Some(encoding) = &args.encoding {
        config.dependency.encoding = encoding.clone();
    }
    if args.no_type_rollup {
        config.dependency.type_rollup = false;
    }

    let manifest = SolutionManifest::from_file(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    let manifest_dir = args
        .manifest
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let (mut tree, types) = manifest.build()?;
    let mut edges = EdgeLog::new();

    let report = if let Some(selected) = &args.project {
        let module = manifest
            .find_module(selected)
            .with_context(|| format!("No module named {selected} in the manifest"))?;
        let target = manifest
            .module_targets(&manifest_dir)
            .into_iter()
            .find(|target| target.key == manifest.module_key(&module.name))
            .with_context(|| format!("No module named {selected} in the manifest"))?;

        if let Some(report) = &args.report {
            config.dependency.report_path = std::env::current_dir()?.join(report);
        }
        let sensor = DependencySensor::new(config.dependency.clone())?;
        analyze_single(&sensor, &target, &mut tree, &types, &mut edges)?
    } else {
        if let Some(report) = &args.report {
            config.dependency.report_path.clone_from(report);
        }
        let sensor = DependencySensor::new(config.dependency.clone())?;
        let targets = manifest.module_targets(&manifest_dir);
        debug!("Analyzing {} modules", targets.len());
        sensor.analyse_modules(&targets, &mut tree, &types, &mut edges)?
    };

    let output = DependencyReport::new(manifest.solution_key(), report, &edges);
    let format = OutputFormat::from(args.format);
    match &args.out {
        Some(path) => {
            output.write_to(path, format)?;
            info!("Dependency report written to {}", path.display());
        }
        None => println!("{}", output.render(format)?),
    }

    display_run_summary(&output, args.out.as_deref());
    Ok(())
}

fn analyze_single(
    sensor: &DependencySensor,
    target: &ModuleTarget,
    tree: &mut InMemoryTree,
    types: &TypeIndex,
    edges: &mut EdgeLog,
) -> anyhow::Result<SensorReport> {
    let mut report = SensorReport::default();
    let Some(node) = tree.resolve_module(&target.key) else {
        anyhow::bail!("{} is not a module of the solution", target.key);
    };
    if !sensor.should_execute(&node) {
        return Ok(report);
    }

    let outcome = sensor
        .analyse(target, tree, types, edges)
        .with_context(|| format!("Dependency analysis failed for {}", node.display_name()))?;
    report.outcomes.push(outcome);
    Ok(report)
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default clrdeps configuration".dimmed());
    println!("{}", "# Save this to a file and customize as needed".dimmed());
    println!(
        "{}",
        "# Usage: clrdeps analyze --manifest solution.yaml --config your-config.yml".dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&ClrdepsConfig::default())?;
    println!("{yaml_output}");

    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(&args.config), &args.properties) {
        Ok(config) => {
            println!("{}", "Configuration file is valid.".bright_green().bold());
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {:#}", "Configuration validation failed:".red(), e);
            eprintln!();
            eprintln!(
                "{}",
                "Tip: use 'clrdeps print-default-config' to see the expected format".dimmed()
            );
            std::process::exit(1);
        }
    };

    display_config_summary(&config);
    Ok(())
}
