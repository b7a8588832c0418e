//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use dao3_api_tools::invoker::DEFAULT_BASE_URL;
use std::time::Duration;

/// MCP server exposing Dao3 (神岛) platform read endpoints over stdio.
#[derive(Debug, Parser)]
#[command(name = "dao3-statistics-mcp", version, about)]
pub struct Cli {
    /// Base URL of the Dao3 API.
    #[arg(long, env = "DAO3_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds (0 or unset: no timeout).
    #[arg(long, env = "DAO3_HTTP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log filter directive; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "DAO3_MCP_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format. Logs always go to stderr.
    #[arg(long, env = "DAO3_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

impl Cli {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            None | Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }
}
