//! Web search for educational content (DuckDuckGo HTML endpoint)

use crate::error::{JobsError, JobsResult};
use chrono::{DateTime, TimeZone};
use karir_core::config::SearchConfig;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

#[derive(Clone)]
pub struct WebSearch {
    client: Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.endpoint)
    }

    pub async fn search(&self, query: &str, max_results: usize) -> JobsResult<Vec<SearchHit>> {
        debug!("Web search: '{}'", query);
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(JobsError::status(response.status(), &self.endpoint));
        }
        let html = response.text().await?;
        Ok(parse_results(&html, max_results))
    }
}

/// `educational content for {topic} {YYYY-MM}`
pub fn educational_query<Tz: TimeZone>(topic: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("educational content for {} {}", topic.trim(), now.format("%Y-%m"))
}

pub fn render_hits(topic: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No educational content found for {}.", topic);
    }
    hits.iter()
        .map(|h| format!("Title: {}\nURL: {}\nSummary: {}", h.title, h.href, h.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct Patterns {
    anchor: Regex,
    class: Regex,
    href: Regex,
    tag: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                anchor: Regex::new(r"(?s)<a\s([^>]*)>(.*?)</a>").ok()?,
                class: Regex::new(r#"class="([^"]*)""#).ok()?,
                href: Regex::new(r#"href="([^"]*)""#).ok()?,
                tag: Regex::new(r"<[^>]*>").ok()?,
            })
        })
        .as_ref()
}

/// Result titles (`result__a`) each followed by their snippet (`result__snippet`).
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let Some(p) = patterns() else { return Vec::new() };
    let mut hits: Vec<SearchHit> = Vec::new();

    for caps in p.anchor.captures_iter(html) {
        let attrs = &caps[1];
        let inner = &caps[2];
        let class = p.class.captures(attrs).map(|c| c[1].to_string()).unwrap_or_default();

        if class.split_whitespace().any(|c| c == "result__a") {
            if hits.len() >= max_results {
                break;
            }
            let href = p.href.captures(attrs).map(|c| c[1].to_string()).unwrap_or_default();
            hits.push(SearchHit {
                title: clean_text(&p.tag, inner),
                href: resolve_href(&decode_entities(&href)),
                body: String::new(),
            });
        } else if class.split_whitespace().any(|c| c == "result__snippet") {
            if let Some(last) = hits.last_mut().filter(|h| h.body.is_empty()) {
                last.body = clean_text(&p.tag, inner);
            }
        }
    }
    hits
}

/// Unwrap DuckDuckGo's `/l/?uddg=` redirect links.
pub fn resolve_href(href: &str) -> String {
    let absolute = if href.starts_with("//") { format!("https:{}", href) } else { href.to_string() };
    if let Ok(parsed) = url::Url::parse(&absolute) {
        if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
            return target.into_owned();
        }
    }
    absolute
}

fn clean_text(tag: &Regex, fragment: &str) -> String {
    let stripped = tag.replace_all(fragment, "");
    decode_entities(stripped.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const PAGE: &str = r#"
        <div class="result results_links">
          <h2 class="result__title">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.coursera.org%2Flearn%2Fdata%3Fa%3D1&amp;rut=abc">Learn <b>Data</b> Analysis</a>
          </h2>
          <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Free &amp; paid <b>courses</b> for analysts.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://example.org/teach">Teaching 101</a>
          <a class="result__snippet" href="https://example.org/teach">Become a teacher.</a>
        </div>
    "#;

    #[test]
    fn parses_titles_links_and_snippets() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Learn Data Analysis");
        assert_eq!(hits[0].href, "https://www.coursera.org/learn/data?a=1");
        assert_eq!(hits[0].body, "Free & paid courses for analysts.");
        assert_eq!(hits[1].href, "https://example.org/teach");
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
    }

    #[test]
    fn query_carries_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(educational_query("UX research", &now), "educational content for UX research 2026-03");
    }

    #[test]
    fn empty_hits_message() {
        assert_eq!(render_hits("design", &[]), "No educational content found for design.");
    }
}
