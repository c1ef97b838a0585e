//! Research handler: a bounded model/tool loop per research subtask.
//!
//! [`ToolLoop`] is an explicit state machine:
//!
//! ```text
//! AwaitingModel --text--> Done
//! AwaitingModel --tool calls--> AwaitingTool --results--> AwaitingModel
//! AwaitingModel --error/timeout--> AwaitingModel (error text appended)
//! any round at the ceiling --> CeilingExhausted
//! ```
//!
//! A round is one batch of tool calls or one failed model call. Tool and model failures are
//! appended to the conversation as text and never abort the loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use env_config::AppConfig;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::llm::{invoke_with_timeout, LlmClient, ToolCall};
use crate::message::Message;
use crate::plan::SubTask;
use crate::prompts::{render, WorkflowPrompts};
use crate::tool_source::ToolSource;
use crate::tools::parse_tool_arguments;

/// Result text when the ceiling is hit before the model produced any text.
pub const UNRESOLVED_MARKER: &str = "[Unresolved]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopLimits {
    /// Maximum rounds before giving up.
    pub max_rounds: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl LoopLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_rounds: config.research.max_rounds,
            model_timeout: config.timeouts.model,
            tool_timeout: config.timeouts.tool,
        }
    }
}

#[derive(Debug)]
enum Phase {
    AwaitingModel,
    AwaitingTool(Vec<ToolCall>),
    Done(String),
    CeilingExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub text: String,
    pub rounds: usize,
    /// True when the ceiling ended the loop.
    pub exhausted: bool,
}

/// Model plus tools, run until the model answers in plain text or the ceiling is reached.
#[derive(Clone)]
pub struct ToolLoop {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    limits: LoopLimits,
}

impl ToolLoop {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>, limits: LoopLimits) -> Self {
        Self { llm, tools, limits }
    }

    pub fn limits(&self) -> LoopLimits {
        self.limits
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let args = parse_tool_arguments(&call.name, &call.arguments);
        let timeout = self.limits.tool_timeout;
        match tokio::time::timeout(timeout, self.tools.call_tool(&call.name, args)).await {
            Ok(Ok(content)) => format!("Tool {} returned: {}", call.name, content.text),
            Ok(Err(e)) => {
                tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                format!("Tool {} failed: {}", call.name, e)
            }
            Err(_) => {
                tracing::warn!(tool = %call.name, ?timeout, "tool call timed out");
                format!(
                    "Tool {} failed: timed out after {}s",
                    call.name,
                    timeout.as_secs_f64()
                )
            }
        }
    }

    fn describe_calls(content: &str, calls: &[ToolCall]) -> String {
        if !content.trim().is_empty() {
            return content.to_string();
        }
        let listed: Vec<String> = calls
            .iter()
            .map(|c| format!("{}({})", c.name, c.arguments))
            .collect();
        format!("Calling tools: {}", listed.join(", "))
    }

    /// Runs the loop over `messages` (system prompt and task already included).
    pub async fn run(&self, mut messages: Vec<Message>) -> LoopOutcome {
        let max_rounds = self.limits.max_rounds;
        let mut phase = Phase::AwaitingModel;
        let mut rounds = 0usize;
        let mut last_text: Option<String> = None;

        loop {
            phase = match phase {
                Phase::AwaitingModel => {
                    let result =
                        invoke_with_timeout(self.llm.as_ref(), &messages, self.limits.model_timeout)
                            .await;
                    match result {
                        Ok(response) => {
                            if !response.content.trim().is_empty() {
                                last_text = Some(response.content.clone());
                            }
                            if response.tool_calls.is_empty() {
                                Phase::Done(response.content)
                            } else if rounds >= max_rounds {
                                Phase::CeilingExhausted
                            } else {
                                messages.push(Message::assistant(Self::describe_calls(
                                    &response.content,
                                    &response.tool_calls,
                                )));
                                Phase::AwaitingTool(response.tool_calls)
                            }
                        }
                        Err(e) => {
                            tracing::warn!(round = rounds, error = %e, "model call failed");
                            messages.push(Message::user(format!(
                                "[Error] model call failed: {}. Please try again.",
                                e
                            )));
                            rounds += 1;
                            if rounds >= max_rounds {
                                Phase::CeilingExhausted
                            } else {
                                Phase::AwaitingModel
                            }
                        }
                    }
                }
                Phase::AwaitingTool(calls) => {
                    tracing::debug!(round = rounds, calls = calls.len(), "running tool calls");
                    let results = join_all(calls.iter().map(|c| self.run_tool(c))).await;
                    messages.extend(results.into_iter().map(Message::user));
                    rounds += 1;
                    Phase::AwaitingModel
                }
                Phase::Done(text) => {
                    let text = if text.trim().is_empty() {
                        last_text.unwrap_or_else(|| UNRESOLVED_MARKER.to_string())
                    } else {
                        text
                    };
                    return LoopOutcome {
                        text,
                        rounds,
                        exhausted: false,
                    };
                }
                Phase::CeilingExhausted => {
                    tracing::warn!(rounds, "iteration ceiling reached, returning best effort");
                    return LoopOutcome {
                        text: last_text.unwrap_or_else(|| UNRESOLVED_MARKER.to_string()),
                        rounds,
                        exhausted: true,
                    };
                }
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub id: String,
    pub text: String,
}

/// Resolves research subtasks with a [`ToolLoop`].
#[derive(Clone)]
pub struct ResearchHandler {
    tool_loop: ToolLoop,
    system_prompt: String,
    task_template: String,
    concurrency: usize,
}

impl ResearchHandler {
    pub fn new(tool_loop: ToolLoop, prompts: &WorkflowPrompts) -> Self {
        Self {
            tool_loop,
            system_prompt: prompts.researcher.clone(),
            task_template: prompts.research_task.clone(),
            concurrency: 4,
        }
    }

    /// Research subtasks in flight at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn task_prompt(&self, subtask: &SubTask) -> String {
        let params = serde_json::to_string_pretty(&subtask.params).unwrap_or_else(|_| "{}".into());
        let vars = HashMap::from([
            ("description", subtask.description.clone()),
            ("params", params),
        ]);
        render(&self.task_template, &vars)
    }

    pub async fn resolve(&self, subtask: &SubTask) -> ResearchResult {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.push(Message::user(self.task_prompt(subtask)));

        let outcome = self.tool_loop.run(messages).await;
        tracing::info!(
            subtask_id = %subtask.id,
            rounds = outcome.rounds,
            exhausted = outcome.exhausted,
            "research subtask resolved"
        );
        ResearchResult {
            id: subtask.id.clone(),
            text: outcome.text,
        }
    }

    /// Resolves all subtasks concurrently; results come back in the order of `subtasks`.
    pub async fn resolve_all(&self, subtasks: &[SubTask]) -> Vec<ResearchResult> {
        let mut done: Vec<(usize, ResearchResult)> =
            stream::iter(subtasks.iter().cloned().enumerate())
                .map(|(index, task)| {
                    let this = self.clone();
                    async move { (index, this.resolve(&task).await) }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        done.sort_by_key(|(index, _)| *index);
        done.into_iter().map(|(_, r)| r).collect()
    }
}
