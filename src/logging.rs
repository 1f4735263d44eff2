use miette::{miette, Result};
use tracing_subscriber::EnvFilter;


/// Initialize a console `tracing` subscriber that uses the provided level filter.
pub fn initialize_tracing(console_level_filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(console_level_filter)
        .with_target(false)
        .try_init()
        .map_err(|error| miette!("Failed to initialize tracing subscriber: {error}"))
}
