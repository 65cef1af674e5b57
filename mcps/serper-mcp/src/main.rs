//! Serper MCP Server
//!
//! Serves web search and scraping tools to MCP clients over SSE.
//!
//! # Configuration
//! Set `SERPER_API_KEY` and `MCP_TOKEN` env vars or configure in
//! `~/.config/serper-mcp/config.toml`

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use serper_mcp::config::Config;
use serper_mcp::transport;
use serper_mcp::upstream::SerperClient;
use serper_mcp::SerperMcpServer;

#[derive(Parser)]
#[command(name = "serper-mcp")]
#[command(about = "MCP server exposing Serper web search and scraping over SSE")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "SERPER_MCP_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Disable bearer token authentication
    #[arg(long)]
    no_auth: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mcp_common::init_tracing(&["serper_mcp", "mcp_common", "tower_http"])?;

    let cli = Cli::parse();

    tracing::info!("Starting Serper MCP Server");

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_auth {
        config.auth.enabled = false;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Serper API: {}", config.serper.base_url);

    let client = SerperClient::new(&config.serper)?;
    let server = SerperMcpServer::new(Arc::new(client));

    transport::serve(&config, server).await
}
