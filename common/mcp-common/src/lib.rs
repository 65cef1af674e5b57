//! MCP Common - Shared utilities for MCP servers
//!
//! This crate provides the protocol plumbing shared by MCP servers:
//!
//! - **Messages**: decoding client bodies into rmcp's typed JSON-RPC model
//! - **Results**: Helper functions for creating `CallToolResult` responses
//! - **Errors**: JSON-RPC error constructors on top of rmcp's `ErrorData`
//! - **Initialization**: tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{decode_client_message, json_success};
//!
//! let message = decode_client_message(body)?;
//! session.send(message).await?;
//! ```

pub mod error;
pub mod init;
pub mod message;
pub mod result;

// Re-export commonly used items at crate root
pub use error::{internal_error, invalid_params, McpResult};
pub use init::init_tracing;
pub use message::{decode_client_message, encode_server_message, message_kind, MessageError};
pub use result::{is_failure, json_success, result_text, text_success, tool_failure};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{
        CallToolResult, ClientJsonRpcMessage, Content, JsonObject, ServerJsonRpcMessage, Tool,
    },
    ErrorData as McpError,
};
