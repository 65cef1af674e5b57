//! Prompt templates offered through `prompts/list` and `prompts/get`

use mcp_common::{invalid_params, JsonObject, McpResult};
use rmcp::model::{GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole};

struct ArgumentSpec {
    name: &'static str,
    description: &'static str,
    required: bool,
    default: Option<&'static str>,
}

struct PromptTemplate {
    name: &'static str,
    description: &'static str,
    arguments: &'static [ArgumentSpec],
    body: &'static str,
}

const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "web_research",
        description: "Research a topic on the web and summarize the findings with sources",
        arguments: &[
            ArgumentSpec {
                name: "topic",
                description: "Topic to research",
                required: true,
                default: None,
            },
            ArgumentSpec {
                name: "focus",
                description: "Aspect of the topic to concentrate on",
                required: false,
                default: Some("a general overview"),
            },
        ],
        body: "Research \"{topic}\" with a focus on {focus}. Use the google_search tool \
               to find authoritative sources, scrape the most relevant pages, and write a \
               concise summary that cites each source URL.",
    },
    PromptTemplate {
        name: "summarize_page",
        description: "Scrape a web page and summarize its content",
        arguments: &[ArgumentSpec {
            name: "url",
            description: "URL of the page to summarize",
            required: true,
            default: None,
        }],
        body: "Use the scrape tool with includeMarkdown set to true to fetch {url}, then \
               summarize the page in a few paragraphs and list its key points.",
    },
    PromptTemplate {
        name: "compare_sources",
        description: "Compare what several search results say about a query",
        arguments: &[
            ArgumentSpec {
                name: "query",
                description: "Search query to compare sources for",
                required: true,
                default: None,
            },
            ArgumentSpec {
                name: "count",
                description: "Number of sources to compare",
                required: false,
                default: Some("3"),
            },
        ],
        body: "Search for \"{query}\" with the google_search tool, pick the top {count} \
               results, scrape each one, and compare where they agree and where they \
               disagree.",
    },
];

/// The fixed set of prompt templates
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptCatalog;

impl PromptCatalog {
    pub fn list(&self) -> Vec<Prompt> {
        TEMPLATES
            .iter()
            .map(|template| {
                let arguments = template
                    .arguments
                    .iter()
                    .map(|arg| PromptArgument {
                        name: arg.name.to_string(),
                        title: None,
                        description: Some(arg.description.to_string()),
                        required: Some(arg.required),
                    })
                    .collect();
                Prompt::new(template.name, Some(template.description), Some(arguments))
            })
            .collect()
    }

    /// Render `name` with `arguments`
    ///
    /// Argument values must be strings; anything else counts as absent.
    pub fn get(&self, name: &str, arguments: &JsonObject) -> McpResult<GetPromptResult> {
        let template = TEMPLATES
            .iter()
            .find(|template| template.name == name)
            .ok_or_else(|| invalid_params(format!("Unknown prompt: {}", name)))?;

        let mut text = template.body.to_string();
        for arg in template.arguments {
            let value = match arguments
                .get(arg.name)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                Some(value) => value,
                None if arg.required => {
                    return Err(invalid_params(format!(
                        "Missing required argument '{}' for prompt {}",
                        arg.name, name
                    )))
                }
                None => arg.default.unwrap_or_default(),
            };
            text = text.replace(&format!("{{{}}}", arg.name), value);
        }

        Ok(GetPromptResult {
            description: Some(template.description.to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::PromptMessageContent;
    use serde_json::json;

    fn args(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_list() {
        let prompts = PromptCatalog.list();
        let names: Vec<&str> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["web_research", "summarize_page", "compare_sources"]);
        let arguments = prompts[0].arguments.as_deref().unwrap();
        assert_eq!(arguments[0].required, Some(true));
        assert_eq!(arguments[1].required, Some(false));
    }

    #[test]
    fn test_get_substitutes_arguments_and_defaults() {
        let result = PromptCatalog
            .get("web_research", &args(json!({"topic": "rust async"})))
            .unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, PromptMessageRole::User);
        let PromptMessageContent::Text { text } = &result.messages[0].content else {
            panic!("expected text content");
        };
        assert!(text.contains("Research \"rust async\" with a focus on a general overview."));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_get_unknown_prompt() {
        let err = PromptCatalog.get("nope", &JsonObject::new()).unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("Unknown prompt: nope"));
    }

    #[test]
    fn test_get_missing_required_argument() {
        let err = PromptCatalog
            .get("summarize_page", &args(json!({"url": "  "})))
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("'url'"));

        let err = PromptCatalog
            .get("summarize_page", &args(json!({"url": 42})))
            .unwrap_err();
        assert!(err.message.contains("'url'"));
    }
}
