//! Search operator query building
//!
//! The structured `google_search` fields are folded into the free-text
//! query as Google search operators. Clause order is fixed:
//!
//! `site:` `filetype:` `inurl:` `intitle:` `related:` `cache:` `before:`
//! `after:` `"exact"` `-excluded` `(a OR b)`
//!
//! Absent and blank fields contribute nothing.

use super::params::GoogleSearchParams;

/// Build the query string sent upstream
pub fn build_query(params: &GoogleSearchParams) -> String {
    let mut query = normalize(&params.q);

    let prefixed = [
        ("site", &params.site),
        ("filetype", &params.filetype),
        ("inurl", &params.inurl),
        ("intitle", &params.intitle),
        ("related", &params.related),
        ("cache", &params.cache),
        ("before", &params.before),
        ("after", &params.after),
    ];
    for (operator, value) in prefixed {
        if let Some(value) = present(value) {
            push_clause(&mut query, &format!("{}:{}", operator, value));
        }
    }

    if let Some(exact) = present(&params.exact) {
        push_clause(&mut query, &format!("\"{}\"", exact));
    }

    if let Some(exclude) = present(&params.exclude) {
        let terms: Vec<String> = split_terms(exclude).map(|t| format!("-{}", t)).collect();
        if !terms.is_empty() {
            push_clause(&mut query, &terms.join(" "));
        }
    }

    if let Some(or_terms) = present(&params.or_terms) {
        let terms: Vec<&str> = split_terms(or_terms).collect();
        if !terms.is_empty() {
            push_clause(&mut query, &format!("({})", terms.join(" OR ")));
        }
    }

    query
}

/// Collapse runs of whitespace and trim
fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn split_terms(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn push_clause(query: &mut String, clause: &str) {
    if !query.is_empty() {
        query.push(' ');
    }
    query.push_str(clause);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: &str) -> GoogleSearchParams {
        GoogleSearchParams {
            q: q.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_query_is_normalized() {
        assert_eq!(build_query(&params("  big   cats ")), "big cats");
    }

    #[test]
    fn test_site_exact_exclude_order() {
        let p = GoogleSearchParams {
            site: Some("wikipedia.org".to_string()),
            exact: Some("big cats".to_string()),
            exclude: Some("dogs,birds".to_string()),
            ..params("cats")
        };
        assert_eq!(
            build_query(&p),
            r#"cats site:wikipedia.org "big cats" -dogs -birds"#
        );
    }

    #[test]
    fn test_every_operator_in_fixed_order() {
        let p = GoogleSearchParams {
            site: Some("a.com".to_string()),
            filetype: Some("pdf".to_string()),
            inurl: Some("docs".to_string()),
            intitle: Some("guide".to_string()),
            related: Some("b.com".to_string()),
            cache: Some("c.com/page".to_string()),
            before: Some("2024-01-01".to_string()),
            after: Some("2023-01-01".to_string()),
            exact: Some("rust async".to_string()),
            exclude: Some("java, go".to_string()),
            or_terms: Some("tokio, async-std ,smol".to_string()),
            ..params("runtime")
        };
        assert_eq!(
            build_query(&p),
            "runtime site:a.com filetype:pdf inurl:docs intitle:guide related:b.com \
             cache:c.com/page before:2024-01-01 after:2023-01-01 \"rust async\" \
             -java -go (tokio OR async-std OR smol)"
        );
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let p = GoogleSearchParams {
            site: Some("  ".to_string()),
            exclude: Some(" , ,".to_string()),
            or_terms: Some(String::new()),
            ..params("cats")
        };
        assert_eq!(build_query(&p), "cats");
    }

    #[test]
    fn test_is_deterministic() {
        let p = GoogleSearchParams {
            intitle: Some("review".to_string()),
            or_terms: Some("a,b".to_string()),
            ..params("laptop")
        };
        assert_eq!(build_query(&p), build_query(&p));
        assert_eq!(build_query(&p), "laptop intitle:review (a OR b)");
    }
}
