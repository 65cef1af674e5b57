//! Tool catalog and typed tool invocations
//!
//! Every tool has a [`ToolKind`], a parameter struct in [`params`], and a
//! schema generated from that struct. An incoming `tools/call` is turned
//! into a [`ToolCall`] before anything runs: required fields are checked
//! against the schema, then the arguments are decoded into the variant's
//! parameter struct.

use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};

use crate::upstream::UpstreamError;

pub mod analysis;
pub mod facade;
pub mod params;
pub mod query;

pub use facade::SearchTools;
use params::*;

/// Names every tool the server knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GoogleSearch,
    Scrape,
    Health,
    ImageSearch,
    AnalyzeSerp,
    ResearchKeywords,
    AnalyzeCompetitors,
    Autocomplete,
}

impl ToolKind {
    /// Catalog order
    pub const ALL: [ToolKind; 8] = [
        ToolKind::GoogleSearch,
        ToolKind::Scrape,
        ToolKind::Health,
        ToolKind::ImageSearch,
        ToolKind::AnalyzeSerp,
        ToolKind::ResearchKeywords,
        ToolKind::AnalyzeCompetitors,
        ToolKind::Autocomplete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::GoogleSearch => "google_search",
            ToolKind::Scrape => "scrape",
            ToolKind::Health => "_health",
            ToolKind::ImageSearch => "image_search",
            ToolKind::AnalyzeSerp => "analyze_serp",
            ToolKind::ResearchKeywords => "research_keywords",
            ToolKind::AnalyzeCompetitors => "analyze_competitors",
            ToolKind::Autocomplete => "autocomplete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::GoogleSearch => {
                "Tool to perform web searches via Serper API and retrieve rich results. \
                 It is able to retrieve organic search results, people also ask, related \
                 searches, and knowledge graph."
            }
            ToolKind::Scrape => {
                "Tool to scrape a webpage and retrieve the text and, optionally, the markdown \
                 content. It will retrieve also the JSON-LD metadata and the head metadata."
            }
            ToolKind::Health => "Health check endpoint",
            ToolKind::ImageSearch => {
                "Tool to search for images via Serper API and retrieve results including \
                 thumbnails and source information."
            }
            ToolKind::AnalyzeSerp => {
                "Analyze a SERP (Search Engine Results Page) for a given query"
            }
            ToolKind::ResearchKeywords => {
                "Research keywords related to a given topic or seed keyword"
            }
            ToolKind::AnalyzeCompetitors => "Analyze competitors for a given keyword or domain",
            ToolKind::Autocomplete => {
                "Get search autocomplete suggestions for multiple queries at once"
            }
        }
    }

    fn input_schema(self) -> Arc<Map<String, Value>> {
        match self {
            ToolKind::GoogleSearch => schema_of::<GoogleSearchParams>(),
            ToolKind::Scrape => schema_of::<ScrapeParams>(),
            ToolKind::Health => schema_of::<HealthParams>(),
            ToolKind::ImageSearch => schema_of::<ImageSearchParams>(),
            ToolKind::AnalyzeSerp => schema_of::<AnalyzeSerpParams>(),
            ToolKind::ResearchKeywords => schema_of::<ResearchKeywordsParams>(),
            ToolKind::AnalyzeCompetitors => schema_of::<AnalyzeCompetitorsParams>(),
            ToolKind::Autocomplete => schema_of::<AutocompleteParams>(),
        }
    }

    /// Required argument names, read from the generated schema
    pub fn required_fields(self) -> Vec<String> {
        let tool = &CATALOG[self as usize];
        tool.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Built once; `tools/list` returns the same descriptors for the life of the process
static CATALOG: LazyLock<Vec<Tool>> = LazyLock::new(|| {
    ToolKind::ALL
        .into_iter()
        .map(|kind| Tool::new(kind.name(), kind.description(), kind.input_schema()))
        .collect()
});

/// The tool descriptors, in catalog order
pub fn catalog() -> &'static [Tool] {
    &CATALOG
}

fn schema_of<T: JsonSchema>() -> Arc<Map<String, Value>> {
    let schema = schemars::schema_for!(T);
    let mut object = match serde_json::to_value(&schema) {
        Ok(Value::Object(object)) => object,
        _ => Map::new(),
    };
    object.remove("$schema");
    object.remove("title");
    object
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    Arc::new(object)
}

/// Why a tool call could not run to completion
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required arguments for {tool}: {}", fields.join(", "))]
    MissingArguments {
        tool: &'static str,
        fields: Vec<String>,
    },

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    #[error("{operation}: {source}")]
    Upstream {
        operation: &'static str,
        source: UpstreamError,
    },

    #[error("failed to encode result: {0}")]
    Encode(String),
}

impl ToolError {
    pub fn upstream(operation: &'static str) -> impl FnOnce(UpstreamError) -> ToolError {
        move |source| ToolError::Upstream { operation, source }
    }
}

/// A validated tool invocation
#[derive(Debug, Clone)]
pub enum ToolCall {
    GoogleSearch(GoogleSearchParams),
    Scrape(ScrapeParams),
    Health(HealthParams),
    ImageSearch(ImageSearchParams),
    AnalyzeSerp(AnalyzeSerpParams),
    ResearchKeywords(ResearchKeywordsParams),
    AnalyzeCompetitors(AnalyzeCompetitorsParams),
    Autocomplete(AutocompleteParams),
}

impl ToolCall {
    /// Resolve `name` and validate `arguments` against the tool's parameters
    pub fn parse(name: &str, arguments: Map<String, Value>) -> Result<Self, ToolError> {
        let kind = ToolKind::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let missing: Vec<String> = kind
            .required_fields()
            .into_iter()
            .filter(|field| arguments.get(field).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingArguments {
                tool: kind.name(),
                fields: missing,
            });
        }

        let call = match kind {
            ToolKind::GoogleSearch => ToolCall::GoogleSearch(decode(kind, arguments)?),
            ToolKind::Scrape => ToolCall::Scrape(decode(kind, arguments)?),
            ToolKind::Health => ToolCall::Health(decode(kind, arguments)?),
            ToolKind::ImageSearch => ToolCall::ImageSearch(decode(kind, arguments)?),
            ToolKind::AnalyzeSerp => ToolCall::AnalyzeSerp(decode(kind, arguments)?),
            ToolKind::ResearchKeywords => ToolCall::ResearchKeywords(decode(kind, arguments)?),
            ToolKind::AnalyzeCompetitors => {
                ToolCall::AnalyzeCompetitors(decode(kind, arguments)?)
            }
            ToolKind::Autocomplete => {
                let mut params: AutocompleteParams = decode(kind, arguments)?;
                params.queries.retain(|q| !q.trim().is_empty());
                if params.queries.is_empty() {
                    return Err(ToolError::InvalidArguments {
                        tool: kind.name(),
                        reason: "No queries provided".to_string(),
                    });
                }
                ToolCall::Autocomplete(params)
            }
        };
        Ok(call)
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::GoogleSearch(_) => ToolKind::GoogleSearch,
            ToolCall::Scrape(_) => ToolKind::Scrape,
            ToolCall::Health(_) => ToolKind::Health,
            ToolCall::ImageSearch(_) => ToolKind::ImageSearch,
            ToolCall::AnalyzeSerp(_) => ToolKind::AnalyzeSerp,
            ToolCall::ResearchKeywords(_) => ToolKind::ResearchKeywords,
            ToolCall::AnalyzeCompetitors(_) => ToolKind::AnalyzeCompetitors,
            ToolCall::Autocomplete(_) => ToolKind::Autocomplete,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: ToolKind, arguments: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(arguments)).map_err(|e| ToolError::InvalidArguments {
        tool: kind.name(),
        reason: e.to_string(),
    })
}
