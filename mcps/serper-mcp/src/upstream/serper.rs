//! Serper backend
//!
//! Implements the SearchApi trait against https://serper.dev.
//! Search, image, autocomplete and scrape calls are JSON POSTs; the health
//! check is a GET.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::types::{
    AutocompleteRequest, HealthStatus, ImageSearchRequest, ImageSearchResponse, ScrapeRequest, SearchRequest,
    SearchResponse,
};
use super::{SearchApi, UpstreamError};
use crate::config::SerperConfig;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Serper API client
pub struct SerperClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(config: &SerperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(path, "Serper request");

        let response = self
            .client
            .post(self.endpoint(path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let text = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Turn non-2xx responses into `UpstreamError::Status` carrying the body
async fn check_status(response: Response) -> Result<Response, UpstreamError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status, "Serper API error: {}", body);
    Err(UpstreamError::Status { status, body })
}

#[async_trait]
impl SearchApi for SerperClient {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, UpstreamError> {
        self.post("search", request).await
    }

    async fn images(
        &self,
        request: &ImageSearchRequest,
    ) -> Result<ImageSearchResponse, UpstreamError> {
        self.post("images", request).await
    }

    async fn autocomplete(&self, requests: &[AutocompleteRequest]) -> Result<Value, UpstreamError> {
        self.post("autocomplete", requests).await
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<Value, UpstreamError> {
        self.post("scrape", request).await
    }

    async fn health(&self) -> HealthStatus {
        let result = self
            .client
            .get(self.endpoint("health"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => HealthStatus::healthy(),
            Ok(response) => {
                HealthStatus::unhealthy(format!("Status code: {}", response.status().as_u16()))
            }
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                HealthStatus::unhealthy(e.to_string())
            }
        }
    }
}
