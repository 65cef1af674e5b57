//! Parameter types for Serper MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Tools
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GoogleSearchParams {
    #[schemars(
        description = "Search query string (e.g., 'artificial intelligence', 'climate change solutions')"
    )]
    pub q: String,

    #[schemars(
        description = "Optional region code for search results in ISO 3166-1 alpha-2 format (e.g., 'us', 'gb', 'de'). Default: 'us'"
    )]
    pub gl: Option<String>,

    #[schemars(
        description = "Optional language code for search results in ISO 639-1 format (e.g., 'en', 'es', 'fr'). Default: 'en'"
    )]
    pub hl: Option<String>,

    #[schemars(
        description = "Optional location for search results (e.g., 'SoHo, New York, United States')"
    )]
    pub location: Option<String>,

    #[schemars(description = "Number of results to return (default: 10)")]
    pub num: Option<u32>,

    #[schemars(description = "Page number of results to return (default: 1)")]
    pub page: Option<u32>,

    #[schemars(
        description = "Time-based search filter ('qdr:h' past hour, 'qdr:d' past day, 'qdr:w' past week, 'qdr:m' past month, 'qdr:y' past year)"
    )]
    pub tbs: Option<String>,

    #[schemars(description = "Whether to autocorrect spelling in query (default: true)")]
    pub autocorrect: Option<bool>,

    #[schemars(description = "Limit results to specific domain (e.g., 'github.com', 'wikipedia.org')")]
    pub site: Option<String>,

    #[schemars(description = "Limit to specific file types (e.g., 'pdf', 'doc', 'xls')")]
    pub filetype: Option<String>,

    #[schemars(description = "Search for pages with word in URL (e.g., 'download', 'tutorial')")]
    pub inurl: Option<String>,

    #[schemars(description = "Search for pages with word in title (e.g., 'review', 'how to')")]
    pub intitle: Option<String>,

    #[schemars(description = "Find similar websites (e.g., 'github.com', 'stackoverflow.com')")]
    pub related: Option<String>,

    #[schemars(description = "View Google's cached version of a specific URL (e.g., 'example.com/page')")]
    pub cache: Option<String>,

    #[schemars(description = "Date before in YYYY-MM-DD format (e.g., '2024-01-01')")]
    pub before: Option<String>,

    #[schemars(description = "Date after in YYYY-MM-DD format (e.g., '2023-01-01')")]
    pub after: Option<String>,

    #[schemars(description = "Exact phrase match (e.g., 'machine learning', 'quantum computing')")]
    pub exact: Option<String>,

    #[schemars(
        description = "Terms to exclude from search results as comma-separated string (e.g., 'spam,ads')"
    )]
    pub exclude: Option<String>,

    #[schemars(
        description = "Alternative terms as comma-separated string (e.g., 'tutorial,guide,course')"
    )]
    #[serde(rename = "or")]
    pub or_terms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeParams {
    #[schemars(description = "The URL of the webpage to scrape.")]
    pub url: String,

    #[schemars(description = "Whether to include markdown content.")]
    #[serde(rename = "includeMarkdown", default)]
    pub include_markdown: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutocompleteParams {
    #[schemars(description = "List of search queries to get autocomplete suggestions for")]
    pub queries: Vec<String>,

    #[schemars(description = "Location for search results (e.g., 'Brazil', 'United States')")]
    pub location: Option<String>,

    #[schemars(description = "Country code (e.g., 'br', 'us'). Default: 'us'")]
    pub gl: Option<String>,

    #[schemars(description = "Language code (e.g., 'pt-br', 'en'). Default: 'en'")]
    pub hl: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HealthParams {
    #[schemars(description = "Dummy parameter for no-parameter tools")]
    pub random_string: Option<String>,
}

// ============================================================================
// Extended Tools
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageSearchParams {
    #[schemars(description = "Search query string for image search (e.g., 'sunset over mountains')")]
    pub q: String,

    #[schemars(description = "Optional region code in ISO 3166-1 alpha-2 format. Default: 'us'")]
    pub gl: Option<String>,

    #[schemars(description = "Optional language code in ISO 639-1 format. Default: 'en'")]
    pub hl: Option<String>,

    #[schemars(description = "Number of image results to return (default: 10)")]
    pub num: Option<u32>,

    #[schemars(description = "Optional location for image results (e.g., 'Paris, France')")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeSerpParams {
    #[schemars(description = "The query whose results page should be analyzed")]
    pub query: String,

    #[schemars(description = "Region code (default: 'us')")]
    pub gl: Option<String>,

    #[schemars(description = "Language code (default: 'en')")]
    pub hl: Option<String>,

    #[schemars(description = "Optional location for the results page")]
    pub location: Option<String>,

    #[schemars(description = "Number of results to analyze, 1-100 (default: 10)")]
    pub num: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResearchKeywordsParams {
    #[schemars(description = "Seed keyword to research")]
    pub keyword: String,

    #[schemars(description = "Language code for the research (default: 'en')")]
    pub language: Option<String>,

    #[schemars(description = "Optional location to localize results")]
    pub location: Option<String>,

    #[schemars(description = "Include 'people also ask' questions (default: true)")]
    #[serde(default = "default_true")]
    pub include_questions: bool,

    #[schemars(description = "Include related searches (default: true)")]
    #[serde(default = "default_true")]
    pub include_related: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeCompetitorsParams {
    #[schemars(description = "Domain to analyze competitors for (e.g., 'example.com')")]
    pub domain: String,

    #[schemars(description = "Keyword to compare rankings on; without it, similar sites are looked up")]
    pub keyword: Option<String>,

    #[schemars(description = "Maximum number of competitors to report, 1-100 (default: 10)")]
    pub num_results: Option<u32>,
}

fn default_true() -> bool {
    true
}
