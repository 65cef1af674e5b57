//! Protocol error helpers
//!
//! Errors that travel back to the client as JSON-RPC `error` objects are
//! represented with rmcp's `ErrorData`. These helpers build them with the
//! standard JSON-RPC codes.

use rmcp::ErrorData as McpError;

/// Type alias for protocol-level results
pub type McpResult<T> = Result<T, McpError>;

/// Create an internal error (-32603) with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// Create an invalid params error (-32602) with a message
///
/// Used when a request's `params` do not match what the method expects,
/// and when a named prompt does not exist.
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}
