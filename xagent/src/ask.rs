//! Ask mode: one question, answered through the bounded tool loop.

use crate::message::Message;
use crate::prompts::WorkflowPrompts;
use crate::research::{LoopOutcome, ToolLoop};

pub struct AskAgent {
    tool_loop: ToolLoop,
    system_prompt: String,
}

impl AskAgent {
    pub fn new(tool_loop: ToolLoop, prompts: &WorkflowPrompts) -> Self {
        Self {
            tool_loop,
            system_prompt: prompts.ask.clone(),
        }
    }

    /// Intent, function call, answer. The model picks tools by itself; results are fed back
    /// until it answers in text or the round ceiling is hit.
    pub async fn answer_with_tools(&self, question: &str) -> LoopOutcome {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.push(Message::user(question.trim()));
        tracing::info!(question = %question.trim(), "ask");
        self.tool_loop.run(messages).await
    }
}
