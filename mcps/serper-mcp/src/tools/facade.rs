//! Tool execution over the upstream search provider
//!
//! [`SearchTools`] turns a validated [`ToolCall`] into one upstream call
//! and shapes the response into tool output. Upstream failures come back
//! as [`ToolError::Upstream`] tagged with the operation that failed.

use mcp_common::{json_success, text_success, CallToolResult};
use serde::Serialize;
use std::sync::Arc;

use super::analysis;
use super::params::*;
use super::query::build_query;
use super::{ToolCall, ToolError};
use crate::upstream::types::HealthState;
use crate::upstream::{
    AutocompleteRequest, ImageSearchRequest, ScrapeRequest, SearchApi, SearchRequest, SearchResponse, UpstreamError,
};

const DEFAULT_REGION: &str = "us";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_ANALYSIS_RESULTS: u32 = 10;
const MAX_ANALYSIS_RESULTS: u32 = 100;

/// Report returned by the `_health` tool
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub provider: String,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The tool façade
#[derive(Clone)]
pub struct SearchTools {
    api: Arc<dyn SearchApi>,
}

impl SearchTools {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        Self { api }
    }

    /// Run one tool call
    pub async fn execute(&self, call: ToolCall) -> Result<CallToolResult, ToolError> {
        match call {
            ToolCall::GoogleSearch(params) => self.google_search(params).await,
            ToolCall::Scrape(params) => self.scrape(params).await,
            ToolCall::Health(_) => encode(&self.health().await),
            ToolCall::ImageSearch(params) => self.image_search(params).await,
            ToolCall::AnalyzeSerp(params) => self.analyze_serp(params).await,
            ToolCall::ResearchKeywords(params) => self.research_keywords(params).await,
            ToolCall::AnalyzeCompetitors(params) => self.analyze_competitors(params).await,
            ToolCall::Autocomplete(params) => self.autocomplete(params).await,
        }
    }

    async fn google_search(&self, params: GoogleSearchParams) -> Result<CallToolResult, ToolError> {
        let request = SearchRequest {
            q: build_query(&params),
            gl: or_default(params.gl, DEFAULT_REGION),
            hl: or_default(params.hl, DEFAULT_LANGUAGE),
            autocorrect: params.autocorrect.unwrap_or(true),
            num: params.num,
            page: params.page,
            location: params.location,
            tbs: params.tbs,
        };
        tracing::info!(query = %request.q, "google_search");

        let response = self
            .api
            .search(&request)
            .await
            .map_err(ToolError::upstream("SearchTool: failed to search"))?;
        encode(&response)
    }

    async fn scrape(&self, params: ScrapeParams) -> Result<CallToolResult, ToolError> {
        let request = ScrapeRequest {
            url: params.url.trim().to_string(),
            include_markdown: params.include_markdown,
        };
        tracing::info!(url = %request.url, "scrape");

        let page = self
            .api
            .scrape(&request)
            .await
            .map_err(ToolError::upstream("ScrapeTool: failed to scrape"))?;
        encode(&page)
    }

    /// Check the provider; an unreachable provider is reported, not raised
    pub async fn health(&self) -> HealthReport {
        let status = self.api.health().await;
        HealthReport {
            status: status.status,
            provider: self.api.name().to_string(),
            version: env!("CARGO_PKG_VERSION"),
            error: status.error,
        }
    }

    async fn image_search(&self, params: ImageSearchParams) -> Result<CallToolResult, ToolError> {
        let request = ImageSearchRequest {
            q: params.q.split_whitespace().collect::<Vec<_>>().join(" "),
            gl: or_default(params.gl, DEFAULT_REGION),
            hl: or_default(params.hl, DEFAULT_LANGUAGE),
            num: params.num,
            location: params.location,
        };
        tracing::info!(query = %request.q, "image_search");

        let response = self
            .api
            .images(&request)
            .await
            .map_err(ToolError::upstream("ImageSearchTool: failed to search images"))?;
        encode(&response)
    }

    async fn analyze_serp(&self, params: AnalyzeSerpParams) -> Result<CallToolResult, ToolError> {
        let num = clamp_results(params.num);
        let response = self
            .plain_search(&params.query, params.gl, params.hl, params.location, Some(num))
            .await
            .map_err(ToolError::upstream("SerpAnalysisTool: failed to analyze SERP"))?;
        Ok(text_success(analysis::serp_report(
            &params.query,
            &response,
            num as usize,
        )))
    }

    async fn research_keywords(
        &self,
        params: ResearchKeywordsParams,
    ) -> Result<CallToolResult, ToolError> {
        let response = self
            .plain_search(&params.keyword, None, params.language, params.location, None)
            .await
            .map_err(ToolError::upstream("KeywordResearchTool: failed to research keywords"))?;
        Ok(text_success(analysis::keyword_report(
            &params.keyword,
            &response,
            params.include_questions,
            params.include_related,
        )))
    }

    async fn analyze_competitors(
        &self,
        params: AnalyzeCompetitorsParams,
    ) -> Result<CallToolResult, ToolError> {
        let query = match params.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => keyword.to_string(),
            _ => format!("related:{}", params.domain.trim()),
        };
        let limit = clamp_results(params.num_results);
        let response = self
            .plain_search(&query, None, None, None, Some(MAX_ANALYSIS_RESULTS.min(limit * 2)))
            .await
            .map_err(ToolError::upstream("CompetitorAnalysisTool: failed to analyze competitors"))?;
        Ok(text_success(analysis::competitor_report(
            &params.domain,
            &query,
            &response,
            limit as usize,
        )))
    }

    async fn autocomplete(&self, params: AutocompleteParams) -> Result<CallToolResult, ToolError> {
        let gl = or_default(params.gl, DEFAULT_REGION);
        let hl = or_default(params.hl, DEFAULT_LANGUAGE);
        let location = params
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        let requests: Vec<AutocompleteRequest> = params
            .queries
            .iter()
            .map(|q| AutocompleteRequest {
                q: q.trim().to_string(),
                gl: gl.clone(),
                hl: hl.clone(),
                location: location.clone(),
            })
            .collect();
        tracing::info!(queries = requests.len(), "autocomplete");

        let suggestions = self
            .api
            .autocomplete(&requests)
            .await
            .map_err(ToolError::upstream(
                "AutocompleteTool: failed to get autocomplete suggestions",
            ))?;
        encode(&suggestions)
    }

    async fn plain_search(
        &self,
        query: &str,
        gl: Option<String>,
        hl: Option<String>,
        location: Option<String>,
        num: Option<u32>,
    ) -> Result<SearchResponse, UpstreamError> {
        let request = SearchRequest {
            q: query.split_whitespace().collect::<Vec<_>>().join(" "),
            gl: or_default(gl, DEFAULT_REGION),
            hl: or_default(hl, DEFAULT_LANGUAGE),
            autocorrect: true,
            num,
            page: None,
            location,
            tbs: None,
        };
        self.api.search(&request).await
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn clamp_results(num: Option<u32>) -> u32 {
    num.unwrap_or(DEFAULT_ANALYSIS_RESULTS)
        .clamp(1, MAX_ANALYSIS_RESULTS)
}

fn encode<T: Serialize>(data: &T) -> Result<CallToolResult, ToolError> {
    json_success(data).map_err(|e| ToolError::Encode(e.message.to_string()))
}
