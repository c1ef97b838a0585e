//! Fetch a page's body as text.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_CRAWL: &str = "crawl";

/// Longest body handed back to the model, in characters.
pub const MAX_CRAWL_CHARS: usize = 8000;

pub struct CrawlTool {
    client: reqwest::Client,
    max_chars: usize,
}

impl Default for CrawlTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_chars: MAX_CRAWL_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// Cuts `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl Tool for CrawlTool {
    fn name(&self) -> &str {
        TOOL_CRAWL
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_CRAWL.to_string(),
            description: Some(
                "Fetch a web page by URL and return its text (truncated).".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "http(s) URL to fetch"}
                },
                "required": ["url"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let url = args
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'url'".to_string()))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolSourceError::InvalidInput(format!(
                "url must start with http:// or https://: {}",
                url
            )));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(ToolSourceError::Transport(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ToolSourceError::Transport(format!("failed to read response: {}", e)))?;
        Ok(ToolCallContent {
            text: truncate_chars(&body, self.max_chars).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Truncation counts characters, not bytes.
    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate_chars("北京天气", 2), "北京");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    /// **Scenario**: Non-http URLs are rejected before any request.
    #[tokio::test]
    async fn rejects_non_http_url() {
        let err = CrawlTool::new()
            .call(json!({"url": "file:///etc/passwd"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(_)));
    }
}
