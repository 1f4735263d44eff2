//! Command-line interface definitions for the `confcheck` binary.

use std::path::PathBuf;

use clap::Parser;



/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "confcheck",
    author,
    about = "Load, default and validate a service configuration file.",
    version
)]
pub struct CLIArgs {
    /// This is the path to the configuration file to use.
    /// If unspecified, this defaults to `./data/configuration.toml`.
    #[arg(
        short = 'c',
        long = "configuration-file-path",
        help = "Path to the configuration file to use. Defaults to ./data/configuration.toml"
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[arg(
        long = "log-level",
        help = "Console log level filter (e.g. \"debug\" or \"confcheck=trace\"). \
                Overrides logging.console_output_level_filter from the configuration file."
    )]
    pub log_level: Option<String>,

    #[arg(
        long = "print-resolved",
        help = "If this flag is present, the validated and resolved configuration \
                is printed to standard output as TOML."
    )]
    pub print_resolved: bool,
}
