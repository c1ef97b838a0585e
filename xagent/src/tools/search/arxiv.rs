//! arXiv Atom export API.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::SearchEngine;
use crate::tool_source::ToolSourceError;

const ARXIV_URL: &str = "http://export.arxiv.org/api/query";

pub struct ArxivSearch {
    client: reqwest::Client,
}

impl Default for ArxivSearch {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

impl ArxivSearch {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("valid entry regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<id>(.*?)</id>").expect("valid id regex"));

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"title: id"` per Atom entry, in feed order.
fn parse_feed(xml: &str) -> Vec<String> {
    ENTRY_RE
        .captures_iter(xml)
        .filter_map(|entry| {
            let body = entry.get(1)?.as_str();
            let title = TITLE_RE.captures(body)?.get(1)?.as_str();
            let id = ID_RE.captures(body)?.get(1)?.as_str();
            Some(format!("{}: {}", collapse_ws(title), id.trim()))
        })
        .collect()
}

#[async_trait]
impl SearchEngine for ArxivSearch {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolSourceError> {
        let response = self
            .client
            .get(ARXIV_URL)
            .query(&[("search_query", query), ("start", "0"), ("max_results", "5")])
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(ToolSourceError::Transport(format!(
                "API error {}",
                response.status()
            )));
        }
        let xml = response
            .text()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("failed to read response: {}", e)))?;
        let lines = parse_feed(&xml);
        Ok(if lines.is_empty() {
            vec!["No results found.".to_string()]
        } else {
            lines
        })
    }
}
