use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{cli::CLIArgs, logging::initialize_tracing};
use confcheck::configuration::Configuration;

mod cli;
mod logging;


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    // Load configuration.
    let configuration = match cli_args.configuration_file_path.as_ref() {
        Some(path) => {
            println!("Loading configuration: {}", path.display());
            Configuration::load_from_path(path)
        }
        None => {
            println!("Loading configuration at default path.");
            Configuration::load_from_default_path()
        }
    }
    .wrap_err("Failed to load configuration file.")?;


    let console_level_filter = match cli_args.log_level.as_ref() {
        Some(level) => EnvFilter::try_new(level)
            .into_diagnostic()
            .wrap_err("Failed to parse --log-level.")?,
        None => configuration.logging.console_output_level_filter(),
    };

    initialize_tracing(console_level_filter).wrap_err("Failed to initialize tracing.")?;

    info!(
        file_path = %configuration.file_path.display(),
        "Configuration loaded and validated."
    );


    if cli_args.print_resolved {
        println!("{}", configuration.to_toml_string()?);
    }

    Ok(())
}
