//! Serper MCP Library
//!
//! Web search and page scraping for MCP clients, backed by the Serper API
//! and served over an SSE session transport.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use serper_mcp::{config::Config, transport, upstream::SerperClient, SerperMcpServer};
//! use std::sync::Arc;
//!
//! let config = Config::load(None)?;
//! let client = SerperClient::new(&config.serper)?;
//! let server = SerperMcpServer::new(Arc::new(client));
//! transport::serve(&config, server).await?;
//! ```
//!
//! # Configuration
//! Set `SERPER_API_KEY` and `MCP_TOKEN`, or configure in
//! `~/.config/serper-mcp/config.toml`

pub mod config;
pub mod prompts;
pub mod server;
pub mod tools;
pub mod transport;
pub mod upstream;

// Re-export main server type
pub use server::SerperMcpServer;
