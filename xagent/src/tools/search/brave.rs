//! Brave search. There is no public endpoint wired up yet; with a key set it answers with a
//! placeholder line.

use async_trait::async_trait;

use super::SearchEngine;
use crate::tool_source::ToolSourceError;

pub struct BraveSearch {
    api_key: Option<String>,
}

impl BraveSearch {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl SearchEngine for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ToolSourceError> {
        Ok(match self.api_key {
            Some(_) => vec![format!("Brave search result for '{}' (mocked)", query)],
            None => vec!["Brave API key not set".to_string()],
        })
    }
}
