//! Tavily search API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::SearchEngine;
use crate::tool_source::ToolSourceError;

const TAVILY_URL: &str = "https://api.tavily.com/search";

pub struct TavilySearch {
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

impl TavilySearch {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_client(api_key, reqwest::Client::new())
    }

    pub fn with_client(api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        }
    }
}

#[async_trait]
impl SearchEngine for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolSourceError> {
        let Some(key) = &self.api_key else {
            return Ok(vec!["Tavily API key not set".to_string()]);
        };
        let body = json!({
            "query": query,
            "max_results": 5,
            "search_depth": "basic",
            "topic": "general",
            "include_answer": false,
            "include_raw_content": false,
            "include_images": false
        });
        let response = self
            .client
            .post(TAVILY_URL)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "API error {}: {}",
                status, text
            )));
        }
        let data: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("bad response: {}", e)))?;
        Ok(data
            .results
            .into_iter()
            .map(|r| format!("{}: {}", r.title, r.url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Without a key the engine answers with a notice instead of calling out.
    #[tokio::test]
    async fn missing_key_notice() {
        let out = TavilySearch::new(None).search("rust").await.unwrap();
        assert_eq!(out, vec!["Tavily API key not set"]);
    }

    /// **Scenario**: Result objects decode with missing fields defaulting to empty.
    #[test]
    fn decode_results() {
        let data: TavilyResponse =
            serde_json::from_str(r#"{"results":[{"title":"Rust","url":"https://rust-lang.org"},{"url":"u"}]}"#)
                .unwrap();
        assert_eq!(data.results.len(), 2);
        assert_eq!(data.results[1].title, "");
    }
}
