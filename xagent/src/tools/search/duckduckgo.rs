//! DuckDuckGo instant-answer API.

use async_trait::async_trait;
use serde::Deserialize;

use super::SearchEngine;
use crate::tool_source::ToolSourceError;

const DDG_URL: &str = "https://api.duckduckgo.com/";

pub struct DuckDuckGoSearch {
    max_results: usize,
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DdgResponse {
    #[serde(default)]
    heading: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<DdgTopic>,
}

/// A related topic is either a result or a named group of results.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DdgTopic {
    Result {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<DdgTopic>,
    },
}

fn flatten(topics: Vec<DdgTopic>, out: &mut Vec<String>) {
    for topic in topics {
        match topic {
            DdgTopic::Result { text, first_url } if !text.is_empty() && !first_url.is_empty() => {
                out.push(format!("{}: {}", text, first_url))
            }
            DdgTopic::Result { .. } => {}
            DdgTopic::Group { topics } => flatten(topics, out),
        }
    }
}

fn to_lines(data: DdgResponse, max_results: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if !data.heading.is_empty() && !data.abstract_url.is_empty() {
        lines.push(format!("{}: {}", data.heading, data.abstract_url));
    }
    flatten(data.related_topics, &mut lines);
    lines.truncate(max_results.max(1));
    if lines.is_empty() {
        lines.push("DuckDuckGo: No relevant results found.".to_string());
    }
    lines
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Self {
        Self::with_client(max_results, reqwest::Client::new())
    }

    pub fn with_client(max_results: usize, client: reqwest::Client) -> Self {
        Self {
            max_results,
            client,
        }
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolSourceError> {
        let response = self
            .client
            .get(DDG_URL)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(ToolSourceError::Transport(format!(
                "API error {}",
                response.status()
            )));
        }
        let data: DdgResponse = response
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("bad response: {}", e)))?;
        Ok(to_lines(data, self.max_results))
    }
}
