//! Console summaries.
//!
//! The rendered report goes to stdout; everything here goes to stderr so
//! the report can be piped.

use std::path::Path;

use owo_colors::OwoColorize;

use clrdeps::core::config::ExecutionMode;
use clrdeps::{ClrdepsConfig, DependencyReport};

/// Print per-run counters after an analysis.
pub fn display_run_summary(report: &DependencyReport, written_to: Option<&Path>) {
    let totals = &report.totals;

    eprintln!();
    eprintln!("{}", "Dependency analysis".bright_blue().bold());
    eprintln!(
        "   {} modules analyzed, {} skipped",
        report.outcomes.len().to_string().cyan(),
        report.skipped.len().to_string().yellow()
    );
    eprintln!(
        "   {} project, {} folder, {} file edges",
        totals.project_edges.to_string().cyan(),
        totals.folder_edges.to_string().cyan(),
        totals.file_edges.to_string().cyan()
    );

    let diagnostics: usize = report.outcomes.iter().map(|o| o.diagnostics.len()).sum();
    if diagnostics > 0 {
        eprintln!(
            "   {} {}",
            diagnostics.to_string().yellow(),
            "diagnostics recorded (see report)".yellow()
        );
    }

    for skipped in &report.skipped {
        eprintln!("   {} {}: {}", "skipped".red(), skipped.project, skipped.reason);
    }

    if let Some(path) = written_to {
        eprintln!("   report: {}", path.display().to_string().cyan());
    }
}

/// Print the settings a configuration resolves to.
pub fn display_config_summary(config: &ClrdepsConfig) {
    let mode = match config.dependency.mode {
        ExecutionMode::Reuse => "reuse",
        ExecutionMode::Skip => "skip",
    };

    println!("{}", "Configuration Summary".bright_blue().bold());
    println!("   mode:        {}", mode.cyan());
    println!(
        "   report:      {}",
        config.dependency.report_path.display().to_string().cyan()
    );
    println!("   encoding:    {}", config.dependency.encoding.cyan());
    println!(
        "   type rollup: {}",
        config.dependency.type_rollup.to_string().cyan()
    );
    println!("   log level:   {}", config.logging.level.cyan());
    println!();
}
