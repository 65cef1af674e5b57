//! Request and response types for the Serper API
//!
//! Response types are lenient: every collection defaults to empty and every
//! scalar that Serper sometimes omits is optional, so a sparse response
//! still decodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload for `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Free-text query with operator clauses already appended
    pub q: String,
    /// Region code (ISO 3166-1 alpha-2)
    pub gl: String,
    /// Language code (ISO 639-1)
    pub hl: String,
    pub autocorrect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Time filter such as `qdr:d`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbs: Option<String>,
}

/// Payload for `POST /images`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSearchRequest {
    pub q: String,
    pub gl: String,
    pub hl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Payload for `POST /scrape`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    pub include_markdown: bool,
}

/// One entry of the `POST /autocomplete` batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteRequest {
    pub q: String,
    pub gl: String,
    pub hl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Response of `POST /search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<Value>,
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people_also_ask: Vec<PeopleAlsoAsk>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_searches: Vec<RelatedSearch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_box: Option<Value>,
}

/// A single organic web result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganicResult {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sitelinks: Vec<Value>,
}

/// A "people also ask" entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeopleAlsoAsk {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSearch {
    pub query: String,
}

/// Response of `POST /images`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSearchResponse {
    #[serde(default)]
    pub images: Vec<ImageResult>,
}

/// An image search result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Outcome of an upstream health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: HealthState::Healthy,
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}
