//! `tracing` setup. Stdout carries the MCP protocol, so every log line goes to stderr.

use crate::config::LogFormat;
use crate::error::{Result, ServerError};
use tracing_subscriber::EnvFilter;

pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ServerError::Config(format!("Invalid log filter '{level}': {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let installed = match format {
        LogFormat::Json => builder.json().with_target(true).try_init(),
        LogFormat::Plain => builder.try_init(),
    };
    installed.map_err(|e| ServerError::Config(format!("Failed to install log subscriber: {e}")))
}
