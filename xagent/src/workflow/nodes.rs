//! Workflow nodes: coordinator, planner, research team and poster.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::aggregate::assemble;
use crate::dispatch::dispatch;
use crate::draw::DrawHandler;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{invoke_with_timeout, LlmClient};
use crate::message::Message;
use crate::plan::{parse_plan, Plan};
use crate::prompts::render;
use crate::publisher::{publish_with_timeout, Publisher};
use crate::research::ResearchHandler;

use super::state::WorkflowState;

pub const COORDINATOR: &str = "coordinator";
pub const PLANNER: &str = "planner";
pub const RESEARCH_TEAM: &str = "research_team";
pub const POSTER: &str = "poster";

pub const EMPTY_REQUEST: &str = "[Error] empty request";

/// Checks the request. An empty one sets [`EMPTY_REQUEST`] as the output; the route after
/// this node ends the run when an output is already set.
pub struct CoordinatorNode;

#[async_trait]
impl Node<WorkflowState> for CoordinatorNode {
    fn id(&self) -> &str {
        COORDINATOR
    }

    async fn run(&self, mut state: WorkflowState) -> Result<(WorkflowState, Next), AgentError> {
        if state.request().is_empty() {
            tracing::warn!("no user request, ending run");
            state.final_output = Some(EMPTY_REQUEST.to_string());
        }
        Ok((state, Next::Continue))
    }
}

/// Asks the model for a plan; any failure gives [`Plan::fallback`].
pub struct PlannerNode {
    llm: Arc<dyn LlmClient>,
    template: String,
    timeout: Duration,
}

impl PlannerNode {
    pub fn new(llm: Arc<dyn LlmClient>, template: impl Into<String>, timeout: Duration) -> Self {
        Self {
            llm,
            template: template.into(),
            timeout,
        }
    }

    /// Plan for `request`. Never fails.
    pub async fn plan(&self, request: &str) -> Plan {
        let prompt = render(&self.template, &HashMap::from([("request", request.to_string())]));
        match invoke_with_timeout(self.llm.as_ref(), &[Message::user(prompt)], self.timeout).await {
            Ok(response) => parse_plan(&response.content, request),
            Err(e) => {
                tracing::warn!(error = %e, "planner model call failed, using fallback plan");
                Plan::fallback(request)
            }
        }
    }
}

#[async_trait]
impl Node<WorkflowState> for PlannerNode {
    fn id(&self) -> &str {
        PLANNER
    }

    async fn run(&self, mut state: WorkflowState) -> Result<(WorkflowState, Next), AgentError> {
        let plan = self.plan(&state.request()).await;
        tracing::info!(
            headline = %plan.headline,
            subtasks = plan.subtasks.len(),
            "plan ready"
        );
        state.plan_iterations += 1;
        state.plan = Some(plan);
        Ok((state, Next::Continue))
    }
}

/// Runs the research and draw branches of the plan concurrently and joins them.
pub struct ResearchTeamNode {
    research: ResearchHandler,
    draw: DrawHandler,
}

impl ResearchTeamNode {
    pub fn new(research: ResearchHandler, draw: DrawHandler) -> Self {
        Self { research, draw }
    }
}

#[async_trait]
impl Node<WorkflowState> for ResearchTeamNode {
    fn id(&self) -> &str {
        RESEARCH_TEAM
    }

    async fn run(&self, mut state: WorkflowState) -> Result<(WorkflowState, Next), AgentError> {
        let plan = match &state.plan {
            Some(plan) => plan.clone(),
            None => {
                tracing::warn!("research_team reached without a plan, using fallback plan");
                let plan = Plan::fallback(&state.request());
                state.plan = Some(plan.clone());
                plan
            }
        };
        let work = dispatch(&plan);
        let (research, draws) = futures::join!(
            self.research.resolve_all(&work.research),
            self.draw.resolve_all(&work.draw)
        );
        state.research_results = research;
        state.draw_results = draws;
        Ok((state, Next::Continue))
    }
}

/// Assembles the post, publishes it and records the outcome.
pub struct PosterNode {
    publisher: Arc<dyn Publisher>,
    timeout: Duration,
}

impl PosterNode {
    pub fn new(publisher: Arc<dyn Publisher>, timeout: Duration) -> Self {
        Self { publisher, timeout }
    }
}

#[async_trait]
impl Node<WorkflowState> for PosterNode {
    fn id(&self) -> &str {
        POSTER
    }

    async fn run(&self, mut state: WorkflowState) -> Result<(WorkflowState, Next), AgentError> {
        let plan = state
            .plan
            .clone()
            .unwrap_or_else(|| Plan::fallback(&state.request()));
        let text = assemble(&plan, &state.research_results, &state.draw_results);
        let output = match publish_with_timeout(self.publisher.as_ref(), &text, self.timeout).await {
            Ok(id) => {
                let output = format!("Posted with ID: {}", id);
                state.publish_id = Some(id);
                output
            }
            Err(tagged) => {
                state.publish_id = None;
                tagged
            }
        };
        state.composed = Some(text);
        state.messages.push(Message::assistant(output.clone()));
        state.final_output = Some(output);
        Ok((state, Next::End))
    }
}
