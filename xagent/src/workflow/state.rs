//! State threaded through the posting workflow.

use serde::{Deserialize, Serialize};

use crate::draw::DrawResult;
use crate::message::{latest_user_request, Message};
use crate::plan::Plan;
use crate::research::ResearchResult;

/// One record per run. Each node owns the fields it writes: the planner writes `plan`,
/// research_team writes the two result lists, the poster writes the output fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub messages: Vec<Message>,
    pub plan: Option<Plan>,
    pub plan_iterations: u32,
    pub research_results: Vec<ResearchResult>,
    pub draw_results: Vec<DrawResult>,
    /// Text handed to the publisher.
    pub composed: Option<String>,
    pub final_output: Option<String>,
    pub publish_id: Option<String>,
}

impl WorkflowState {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(request)],
            ..Default::default()
        }
    }

    /// Trimmed text of the last user turn; empty when there is none.
    pub fn request(&self) -> String {
        latest_user_request(&self.messages)
            .map(|r| r.trim().to_string())
            .unwrap_or_default()
    }

    /// Keeps the conversation, appends `request` and clears everything a run produces.
    pub fn continue_with(mut self, request: impl Into<String>) -> Self {
        self.messages.push(Message::user(request));
        self.plan = None;
        self.research_results.clear();
        self.draw_results.clear();
        self.composed = None;
        self.final_output = None;
        self.publish_id = None;
        self
    }
}
