//! clrdeps CLI
//!
//! Builds project, folder and file dependency graphs from the XML reports a
//! dependency-parser tool writes for .NET assemblies.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use clrdeps::core::config::{ClrdepsConfig, LoggingConfig};
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = logging_settings(&cli);
    init_logging(cli.verbose, &logging);

    match cli.command {
        Commands::Analyze(args) => cli::analyze_command(args)?,
        Commands::PrintDefaultConfig => cli::print_default_config()?,
        Commands::ValidateConfig(args) => cli::validate_config(args)?,
    }

    Ok(())
}

/// Logging settings from the configuration file, if one was given and loads.
/// Errors are reported later, when the command loads the file for real.
fn logging_settings(cli: &Cli) -> LoggingConfig {
    let path = match &cli.command {
        Commands::Analyze(args) => args.config.as_deref(),
        Commands::ValidateConfig(args) => Some(args.config.as_path()),
        Commands::PrintDefaultConfig => None,
    };

    path.and_then(|path| ClrdepsConfig::from_yaml_file(path).ok())
        .map(|config| config.logging)
        .unwrap_or_default()
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
