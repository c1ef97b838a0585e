//! `web_search`: one query fanned out to every configured engine, results merged.
//!
//! Engines run concurrently; their lists are concatenated in configuration order, deduplicated
//! keeping the first occurrence and cut to [`MAX_MERGED_RESULTS`]. An engine failure becomes an
//! in-band `"{engine} search error: {e}"` line and an unknown engine name becomes
//! `"Unknown search tool: {name}"`, so the tool itself only fails on bad arguments.

mod arxiv;
mod brave;
mod duckduckgo;
mod tavily;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use env_config::SearchSettings;
use futures::future::join_all;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub use arxiv::ArxivSearch;
pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;
pub use tavily::TavilySearch;

pub const TOOL_WEB_SEARCH: &str = "web_search";

pub const MAX_MERGED_RESULTS: usize = 10;

/// One search backend. Results are human-readable lines, usually `"title: url"`.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolSourceError>;
}

enum EngineSlot {
    Known(Arc<dyn SearchEngine>),
    Unknown(String),
}

pub struct WebSearchTool {
    engines: Vec<EngineSlot>,
}

impl WebSearchTool {
    pub fn new(engines: Vec<Arc<dyn SearchEngine>>) -> Self {
        Self {
            engines: engines.into_iter().map(EngineSlot::Known).collect(),
        }
    }

    /// Builds engines from `SEARCH_API` names; names are matched case-insensitively.
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let client = reqwest::Client::new();
        let engines = settings
            .engines
            .iter()
            .map(|name| match name.trim().to_lowercase().as_str() {
                "tavily" => EngineSlot::Known(Arc::new(TavilySearch::with_client(
                    settings.tavily_api_key.clone(),
                    client.clone(),
                ))),
                "duckduckgo" => EngineSlot::Known(Arc::new(DuckDuckGoSearch::with_client(
                    settings.max_results,
                    client.clone(),
                ))),
                "arxiv" => EngineSlot::Known(Arc::new(ArxivSearch::with_client(client.clone()))),
                "brave" => EngineSlot::Known(Arc::new(BraveSearch::new(
                    settings.brave_api_key.clone(),
                ))),
                other => EngineSlot::Unknown(other.to_string()),
            })
            .collect();
        Self { engines }
    }

    /// Runs every engine and merges the lines.
    pub async fn search(&self, query: &str) -> Vec<String> {
        let runs = self.engines.iter().map(|slot| async move {
            match slot {
                EngineSlot::Known(engine) => match engine.search(query).await {
                    Ok(lines) => lines,
                    Err(e) => {
                        tracing::warn!(engine = engine.name(), error = %e, "search engine failed");
                        vec![format!("{} search error: {}", engine.name(), e)]
                    }
                },
                EngineSlot::Unknown(name) => vec![format!("Unknown search tool: {}", name)],
            }
        });
        merge_results(join_all(runs).await)
    }
}

/// Concatenates per-engine lists, drops blanks and repeats, keeps the first ten.
pub fn merge_results(per_engine: Vec<Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    per_engine
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| seen.insert(line.clone()))
        .take(MAX_MERGED_RESULTS)
        .collect()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        TOOL_WEB_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_WEB_SEARCH.to_string(),
            description: Some(
                "Search the web with all configured engines and return merged results, one per line."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"}
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing 'query'".to_string()))?;
        let lines = self.search(query).await;
        Ok(ToolCallContent {
            text: lines.join("\n"),
        })
    }
}
