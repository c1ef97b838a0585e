//! Mock LLM for tests and offline runs.
//!
//! Replays a script of responses in order; once the script is exhausted the last response
//! repeats. Every received message list is recorded for assertions.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, ToolCall};
use crate::message::Message;

pub struct MockLlm {
    script: Vec<Result<LlmResponse, String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Always answers with `content` and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse::text(content)])
    }

    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::scripted(vec![LlmResponse::with_tool_calls(content, tool_calls)])
    }

    /// First call requests `tool_calls`, every later call answers `final_content`.
    pub fn first_tools_then_end(tool_calls: Vec<ToolCall>, final_content: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse::with_tool_calls("", tool_calls),
            LlmResponse::text(final_content),
        ])
    }

    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: responses.into_iter().map(Ok).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: vec![Err(message.into())],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Message lists received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let n = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(messages.to_vec());
                calls.len() - 1
            }
            Err(_) => return Err(AgentError::ExecutionFailed("mock call log poisoned".into())),
        };
        let step = self
            .script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Ok(LlmResponse::default()));
        step.map_err(AgentError::ExecutionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted responses come back in order and the last one repeats.
    #[tokio::test]
    async fn script_in_order_then_repeat_last() {
        let llm = MockLlm::scripted(vec![LlmResponse::text("one"), LlmResponse::text("two")]);
        let msgs = vec![Message::user("hi")];
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "one");
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "two");
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "two");
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.calls()[0], msgs);
    }

    /// **Scenario**: first_tools_then_end returns tool calls once, then plain text.
    #[tokio::test]
    async fn tools_then_text() {
        let call = ToolCall {
            name: "get_current_weather".into(),
            arguments: "{}".into(),
            id: Some("call-1".into()),
        };
        let llm = MockLlm::first_tools_then_end(vec![call.clone()], "done");
        assert_eq!(llm.invoke(&[]).await.unwrap().tool_calls, vec![call]);
        let second = llm.invoke(&[]).await.unwrap();
        assert!(second.tool_calls.is_empty());
        assert_eq!(second.content, "done");
    }

    /// **Scenario**: A failing mock returns ExecutionFailed on every call.
    #[tokio::test]
    async fn failing_mock() {
        let llm = MockLlm::failing("503");
        let err = llm.invoke(&[]).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
