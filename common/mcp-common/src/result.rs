//! Result helpers for MCP tool responses
//!
//! Tool output is always delivered as text content. A tool that ran and
//! reported a problem returns a result with `isError: true`; it is not a
//! protocol error.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::internal_error;

/// Create a successful response from any serializable data
///
/// The payload is pretty-printed JSON inside a single text content item.
///
/// ```rust,ignore
/// let response = client.search(&request).await?;
/// json_success(&response)
/// ```
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Create a successful plain text response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Create a tool failure result carrying `message`
pub fn tool_failure(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Concatenate the text of every text content item in `result`
///
/// Goes through the wire representation so it does not depend on how the
/// content enum is laid out.
pub fn result_text(result: &CallToolResult) -> String {
    let Ok(value) = serde_json::to_value(result) else {
        return String::new();
    };
    value["content"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Whether `result` is a tool failure
pub fn is_failure(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_json_success() {
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        let result = json_success(&data).unwrap();
        assert!(!is_failure(&result));
        assert_eq!(result.content.len(), 1);
        assert!(result_text(&result).contains("\"value\": 42"));
    }

    #[test]
    fn test_text_success() {
        let result = text_success("hello world");
        assert!(!is_failure(&result));
        assert_eq!(result_text(&result), "hello world");
    }

    #[test]
    fn test_tool_failure() {
        let result = tool_failure("scrape failed: timeout");
        assert!(is_failure(&result));
        assert_eq!(result_text(&result), "scrape failed: timeout");
    }
}
