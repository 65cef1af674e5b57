//! Text reports built from a search response
//!
//! These back the extended tools. They only rearrange what a single search
//! returned; no scoring or ranking model is involved.

use std::collections::HashMap;
use std::fmt::Write;

use crate::upstream::SearchResponse;

/// Summary of one results page
pub fn serp_report(query: &str, response: &SearchResponse, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SERP analysis for \"{}\"", query);
    let _ = writeln!(out, "Organic results: {}", response.organic.len());
    let _ = writeln!(out, "Answer box: {}", presence(response.answer_box.is_some()));
    let _ = writeln!(
        out,
        "Knowledge graph: {}",
        presence(response.knowledge_graph.is_some())
    );

    if !response.organic.is_empty() {
        let _ = writeln!(out, "\nTop results:");
        for (index, result) in response.organic.iter().take(limit).enumerate() {
            let position = result.position.map_or(index + 1, |p| p as usize);
            let _ = writeln!(out, "{}. {} - {}", position, result.title, result.link);
            if let Some(snippet) = &result.snippet {
                let _ = writeln!(out, "   {}", snippet);
            }
        }
    }

    push_questions(&mut out, response);
    push_related(&mut out, response);
    out
}

/// Related searches and questions around a seed keyword
pub fn keyword_report(
    keyword: &str,
    response: &SearchResponse,
    include_questions: bool,
    include_related: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Keyword research for \"{}\"", keyword);

    if include_related {
        push_related(&mut out, response);
    }
    if include_questions {
        push_questions(&mut out, response);
    }
    if (!include_related || response.related_searches.is_empty())
        && (!include_questions || response.people_also_ask.is_empty())
    {
        let _ = writeln!(out, "\nNo related keywords found.");
    }
    out
}

/// Domains ranking alongside `domain`, best position first
pub fn competitor_report(
    domain: &str,
    query: &str,
    response: &SearchResponse,
    limit: usize,
) -> String {
    let subject = domain.trim().trim_start_matches("www.").to_ascii_lowercase();

    let mut best: HashMap<String, (usize, String)> = HashMap::new();
    for (index, result) in response.organic.iter().enumerate() {
        let Some(host) = host_of(&result.link) else {
            continue;
        };
        if host == subject || host.ends_with(&format!(".{}", subject)) {
            continue;
        }
        let position = result.position.map_or(index + 1, |p| p as usize);
        best.entry(host)
            .and_modify(|entry| {
                if position < entry.0 {
                    *entry = (position, result.title.clone());
                }
            })
            .or_insert_with(|| (position, result.title.clone()));
    }

    let mut ranked: Vec<(String, (usize, String))> = best.into_iter().collect();
    ranked.sort_by(|a, b| a.1 .0.cmp(&b.1 .0).then_with(|| a.0.cmp(&b.0)));

    let mut out = String::new();
    let _ = writeln!(out, "Competitor analysis for {} (query: \"{}\")", subject, query);
    if ranked.is_empty() {
        let _ = writeln!(out, "\nNo competing domains found.");
        return out;
    }
    let _ = writeln!(out);
    for (host, (position, title)) in ranked.into_iter().take(limit) {
        let _ = writeln!(out, "#{} {} - {}", position, host, title);
    }
    out
}

fn host_of(link: &str) -> Option<String> {
    let url = url::Url::parse(link).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}

fn push_questions(out: &mut String, response: &SearchResponse) {
    if response.people_also_ask.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nPeople also ask:");
    for question in &response.people_also_ask {
        let _ = writeln!(out, "- {}", question.question);
    }
}

fn push_related(out: &mut String, response: &SearchResponse) {
    if response.related_searches.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nRelated searches:");
    for related in &response.related_searches {
        let _ = writeln!(out, "- {}", related.query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> SearchResponse {
        serde_json::from_value(json!({
            "organic": [
                {"title": "Ours", "link": "https://www.example.com/a", "position": 1},
                {"title": "Rival A", "link": "https://rival-a.com/x", "position": 2, "snippet": "fast"},
                {"title": "Rival B", "link": "https://blog.rival-b.io/y", "position": 3},
                {"title": "Rival A again", "link": "https://www.rival-a.com/z", "position": 4},
                {"title": "Sub of ours", "link": "https://docs.example.com/", "position": 5}
            ],
            "peopleAlsoAsk": [{"question": "Is it fast?"}],
            "relatedSearches": [{"query": "example alternatives"}],
            "answerBox": {"answer": "42"}
        }))
        .unwrap()
    }

    #[test]
    fn test_serp_report() {
        let report = serp_report("example", &response(), 2);
        assert!(report.contains("Organic results: 5"));
        assert!(report.contains("Answer box: present"));
        assert!(report.contains("Knowledge graph: absent"));
        assert!(report.contains("2. Rival A - https://rival-a.com/x\n   fast"));
        assert!(!report.contains("Rival B"));
        assert!(report.contains("- Is it fast?"));
        assert!(report.contains("- example alternatives"));
    }

    #[test]
    fn test_keyword_report_sections() {
        let report = keyword_report("example", &response(), false, true);
        assert!(report.contains("Related searches:"));
        assert!(!report.contains("People also ask:"));

        let empty = keyword_report("example", &SearchResponse::default(), true, true);
        assert!(empty.contains("No related keywords found."));
    }

    #[test]
    fn test_competitor_report_excludes_subject_and_dedupes() {
        let report = competitor_report("example.com", "example", &response(), 10);
        assert!(!report.contains("Ours"));
        assert!(!report.contains("docs.example.com"));
        assert!(report.contains("#2 rival-a.com - Rival A\n"));
        assert!(report.contains("#3 blog.rival-b.io - Rival B"));
        assert!(!report.contains("Rival A again"));
    }

    #[test]
    fn test_competitor_report_empty() {
        let report = competitor_report("example.com", "x", &SearchResponse::default(), 10);
        assert!(report.contains("No competing domains found."));
    }
}
