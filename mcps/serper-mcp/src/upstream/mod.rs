//! Upstream search provider
//!
//! This module provides a trait-based abstraction over the search/scrape
//! provider so the tool layer can be exercised against a test double.
//! [`SerperClient`] is the production implementation.

use async_trait::async_trait;
use serde_json::Value;

pub mod serper;
pub mod types;

pub use serper::SerperClient;
pub use types::{
    AutocompleteRequest, HealthStatus, ImageSearchRequest, ImageSearchResponse, ScrapeRequest, SearchRequest,
    SearchResponse,
};

/// Failure talking to the upstream provider
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Network failure, timeout, or TLS error
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose body did not decode
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Trait for the search/scrape provider
///
/// Every call is one fresh round trip; implementations do not retry or cache.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Perform a web search
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, UpstreamError>;

    /// Perform an image search
    async fn images(
        &self,
        request: &ImageSearchRequest,
    ) -> Result<ImageSearchResponse, UpstreamError>;

    /// Suggestions for a batch of queries, sent as one request
    async fn autocomplete(&self, requests: &[AutocompleteRequest]) -> Result<Value, UpstreamError>;

    /// Fetch and extract a web page
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Value, UpstreamError>;

    /// Check the provider; never fails, an unreachable provider is `unhealthy`
    async fn health(&self) -> HealthStatus;
}
