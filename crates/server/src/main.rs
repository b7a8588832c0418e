//! Dao3 statistics MCP server.
//!
//! Exposes the Dao3 (神岛) creator-platform read endpoints as MCP tools over stdio.

use anyhow::Context as _;
use clap::Parser as _;
use dao3_api_tools::invoker::{HttpUpstream, Invoker};
use rmcp::ServiceExt as _;
use rmcp::transport::stdio;
use std::sync::Arc;
use tracing::info;

mod config;
mod error;
mod logging;
mod server;

use config::Cli;
use server::StatisticsServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format)?;

    let upstream = HttpUpstream::default().with_timeout(cli.timeout());
    let invoker = Invoker::new(&cli.base_url, Arc::new(upstream))
        .with_context(|| format!("Invalid --base-url '{}'", cli.base_url))?;
    let invoker = Arc::new(invoker);

    let server = StatisticsServer::build(&invoker).context("register tools")?;
    info!(
        base_url = %invoker.base_url(),
        tools = server.tool_count(),
        "starting MCP server on stdio"
    );

    let service = server
        .serve(stdio())
        .await
        .context("MCP initialization failed")?;
    let reason = service.waiting().await.context("MCP service task failed")?;
    info!(?reason, "MCP server stopped");

    Ok(())
}
