use anyhow::{anyhow, Result};
use landed_core::config::{AppConfig, LogFormat};
use tracing::Level;

/// Installs the global subscriber on stderr so stdout carries only the JSON
/// command payload. Calling it twice is an error.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("could not install tracing subscriber: {error}"))
}
