//! Tool source abstraction: list tools and call a tool by name.
//!
//! The research loop and ask mode depend on `ToolSource` rather than on concrete tools;
//! [`ToolRegistry`](crate::tools::ToolRegistry) is the implementation used by the binary.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification: name, description for the model and JSON Schema for arguments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result of a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

impl ToolCallContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Errors from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Lists and calls tools.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant names the failure.
    #[test]
    fn tool_source_error_display() {
        assert_eq!(
            ToolSourceError::NotFound("x".into()).to_string(),
            "tool not found: x"
        );
        assert!(ToolSourceError::InvalidInput("bad".into())
            .to_string()
            .contains("invalid"));
        assert!(ToolSourceError::Transport("net".into())
            .to_string()
            .contains("transport"));
    }

    /// **Scenario**: ToolSpec round-trips through JSON with the schema intact.
    #[test]
    fn tool_spec_serde() {
        let spec = ToolSpec {
            name: "crawl".into(),
            description: Some("Fetch a page".into()),
            input_schema: serde_json::json!({"type": "object"}),
        };
        let back: ToolSpec = serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(back, spec);
    }
}
