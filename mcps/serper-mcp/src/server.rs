//! MCP server implementation for Serper web search
//!
//! Wires the tool catalog, the tool façade and the prompt catalog into an
//! rmcp [`ServerHandler`]. One handler value is cloned into every session.

use mcp_common::{tool_failure, CallToolResult, JsonObject, McpError};
use rmcp::{
    model::{
        CallToolRequestParam, GetPromptRequestParam, GetPromptResult, Implementation,
        ListPromptsResult, ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer, ServerHandler,
};
use std::sync::Arc;

use crate::prompts::PromptCatalog;
use crate::tools::{catalog, SearchTools, ToolCall, ToolError};
use crate::upstream::SearchApi;

const INSTRUCTIONS: &str = "Web search and page scraping backed by the Serper API. \
Use google_search for web results (supports site:, filetype:, exact phrase and other \
operators as separate fields), autocomplete for query suggestions, scrape to extract \
page text or markdown, and _health to check upstream availability.";

/// The Serper MCP server
#[derive(Clone)]
pub struct SerperMcpServer {
    tools: SearchTools,
    prompts: PromptCatalog,
}

impl SerperMcpServer {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        tracing::info!(provider = api.name(), "Creating Serper MCP server");
        Self {
            tools: SearchTools::new(api),
            prompts: PromptCatalog,
        }
    }

    /// The tool façade, for callers outside the protocol path
    pub fn tools(&self) -> &SearchTools {
        &self.tools
    }

    /// Run the tool `name`
    ///
    /// Never fails at the protocol level: unknown tools, bad arguments and
    /// upstream problems all come back as a failure result.
    pub async fn run_tool(&self, name: &str, arguments: JsonObject) -> CallToolResult {
        let outcome = match ToolCall::parse(name, arguments) {
            Ok(call) => self.tools.execute(call).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(result) => result,
            Err(err @ (ToolError::UnknownTool(_) | ToolError::MissingArguments { .. })) => {
                tracing::warn!(tool = name, "Rejected tool call: {}", err);
                tool_failure(err.to_string())
            }
            Err(err) => {
                tracing::warn!(tool = name, "Tool failed: {}", err);
                tool_failure(format!("Tool {} failed: {}", name, err))
            }
        }
    }
}

impl ServerHandler for SerperMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "serper-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(catalog().to_vec()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .run_tool(&request.name, request.arguments.unwrap_or_default())
            .await)
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(self.prompts.list()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.prompts
            .get(&request.name, &request.arguments.unwrap_or_default())
    }
}
