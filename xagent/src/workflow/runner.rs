//! Workflow runner: builds the graph once and runs requests through it.
//!
//! Graph: START → coordinator → [request?] → planner | END, planner → research_team → poster → END.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::draw::DrawHandler;
use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
use crate::llm::LlmClient;
use crate::memory::{Checkpoint, CheckpointError, CheckpointSource, Checkpointer, RunnableConfig};
use crate::plan::Plan;
use crate::prompts::WorkflowPrompts;
use crate::publisher::Publisher;
use crate::research::ResearchHandler;

use super::nodes::{
    CoordinatorNode, PlannerNode, PosterNode, ResearchTeamNode, COORDINATOR, PLANNER, POSTER,
    RESEARCH_TEAM,
};
use super::state::WorkflowState;

/// Everything the nodes need, built by the caller from config.
pub struct WorkflowDeps {
    pub planner_llm: Arc<dyn LlmClient>,
    pub research: ResearchHandler,
    pub draw: DrawHandler,
    pub publisher: Arc<dyn Publisher>,
    pub prompts: WorkflowPrompts,
    pub model_timeout: Duration,
    pub publish_timeout: Duration,
    pub recursion_limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowRunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("no checkpointer configured")]
    NoCheckpointer,
}

fn coordinator_route(state: &WorkflowState) -> String {
    if state.final_output.is_some() {
        END.to_string()
    } else {
        PLANNER.to_string()
    }
}

pub struct WorkflowRunner {
    compiled: CompiledStateGraph<WorkflowState>,
    planner: Arc<PlannerNode>,
    checkpointer: Option<Arc<dyn Checkpointer<WorkflowState>>>,
}

impl WorkflowRunner {
    pub fn new(
        deps: WorkflowDeps,
        checkpointer: Option<Arc<dyn Checkpointer<WorkflowState>>>,
    ) -> Result<Self, CompilationError> {
        let planner = Arc::new(PlannerNode::new(
            deps.planner_llm,
            deps.prompts.planner.clone(),
            deps.model_timeout,
        ));
        let limit = if deps.recursion_limit == 0 {
            DEFAULT_RECURSION_LIMIT
        } else {
            deps.recursion_limit
        };

        let coordinator_map: HashMap<String, String> = [
            (PLANNER.to_string(), PLANNER.to_string()),
            (END.to_string(), END.to_string()),
        ]
        .into_iter()
        .collect();

        let mut graph = StateGraph::<WorkflowState>::new().with_recursion_limit(limit);
        graph
            .add_node(COORDINATOR, Arc::new(CoordinatorNode))
            .add_node(PLANNER, planner.clone())
            .add_node(
                RESEARCH_TEAM,
                Arc::new(ResearchTeamNode::new(deps.research, deps.draw)),
            )
            .add_node(
                POSTER,
                Arc::new(PosterNode::new(deps.publisher, deps.publish_timeout)),
            )
            .add_edge(START, COORDINATOR)
            .add_conditional_edges(COORDINATOR, Arc::new(coordinator_route), Some(coordinator_map))
            .add_edge(PLANNER, RESEARCH_TEAM)
            .add_edge(RESEARCH_TEAM, POSTER)
            .add_edge(POSTER, END);

        let compiled = match &checkpointer {
            Some(cp) => graph.compile_with_checkpointer(cp.clone())?,
            None => graph.compile()?,
        };
        Ok(Self {
            compiled,
            planner,
            checkpointer,
        })
    }

    /// Plans `request` without running the rest of the workflow.
    pub async fn plan(&self, request: &str) -> Plan {
        self.planner.plan(request.trim()).await
    }

    /// Fresh state, or the saved state of `thread_id` continued with `request`.
    async fn initial_state(
        &self,
        request: &str,
        config: Option<&RunnableConfig>,
    ) -> Result<WorkflowState, CheckpointError> {
        if let (Some(cp), Some(config)) = (&self.checkpointer, config) {
            if config.thread_id.is_some() {
                if let Some((checkpoint, _)) = cp.get_tuple(config).await? {
                    tracing::debug!(thread_id = ?config.thread_id, "continuing saved run");
                    return Ok(checkpoint.state.continue_with(request));
                }
            }
        }
        Ok(WorkflowState::new(request))
    }

    /// Runs one request end to end. Publish failures are not errors: they show up as the
    /// `[Error] ...` text in `final_output`.
    pub async fn run(
        &self,
        request: &str,
        thread_id: Option<&str>,
    ) -> Result<WorkflowState, WorkflowRunError> {
        let config = thread_id.map(RunnableConfig::for_thread);
        let state = self.initial_state(request, config.as_ref()).await?;
        Ok(self.compiled.invoke(state, config).await?)
    }

    /// Stores `state` under `run_id`; returns the checkpoint id.
    pub async fn save(&self, run_id: &str, state: &WorkflowState) -> Result<String, WorkflowRunError> {
        let cp = self.checkpointer.as_ref().ok_or(WorkflowRunError::NoCheckpointer)?;
        let checkpoint =
            Checkpoint::from_state(state.clone(), CheckpointSource::Update, state.plan_iterations as i64);
        Ok(cp.put(&RunnableConfig::for_thread(run_id), &checkpoint).await?)
    }

    /// Latest state saved under `run_id`.
    pub async fn load(&self, run_id: &str) -> Result<Option<WorkflowState>, WorkflowRunError> {
        if self.checkpointer.is_none() {
            return Err(WorkflowRunError::NoCheckpointer);
        }
        Ok(self.compiled.get_state(&RunnableConfig::for_thread(run_id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::memory::MemorySaver;
    use crate::publisher::DryRunPublisher;
    use crate::research::{LoopLimits, ToolLoop};
    use crate::tools::ToolRegistry;

    use crate::workflow::EMPTY_REQUEST;

    const PLAN_JSON: &str = r#"{"headline": "T", "subtasks": [
        {"id": "r1", "kind": "research", "description": "X"},
        {"id": "d1", "kind": "draw", "description": "Y"}]}"#;

    fn deps(planner: MockLlm, researcher: MockLlm) -> WorkflowDeps {
        let prompts = WorkflowPrompts::embedded();
        let tool_loop = ToolLoop::new(
            Arc::new(researcher),
            Arc::new(ToolRegistry::new()),
            LoopLimits::default(),
        );
        WorkflowDeps {
            planner_llm: Arc::new(planner),
            research: ResearchHandler::new(tool_loop, &prompts),
            draw: DrawHandler::new("http://img.test"),
            publisher: Arc::new(DryRunPublisher),
            prompts,
            model_timeout: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(5),
            recursion_limit: 0,
        }
    }

    /// **Scenario**: A full run plans, researches, draws, posts and records the output.
    #[tokio::test]
    async fn full_run_posts() {
        let runner = WorkflowRunner::new(
            deps(
                MockLlm::with_no_tool_calls(PLAN_JSON),
                MockLlm::with_no_tool_calls("Answer"),
            ),
            None,
        )
        .unwrap();
        let state = runner.run("post about X", None).await.unwrap();
        assert_eq!(state.plan_iterations, 1);
        let composed = state.composed.as_deref().unwrap();
        assert!(composed.starts_with("T\nAnswer\n[Image: http://img.test/"), "{}", composed);
        let id = state.publish_id.clone().unwrap();
        assert_eq!(state.final_output, Some(format!("Posted with ID: {}", id)));
    }

    /// **Scenario**: An empty request ends right after the coordinator.
    #[tokio::test]
    async fn empty_request_short_circuits() {
        let planner = Arc::new(MockLlm::with_no_tool_calls(PLAN_JSON));
        let mut d = deps(MockLlm::with_no_tool_calls(""), MockLlm::with_no_tool_calls(""));
        d.planner_llm = planner.clone();
        let runner = WorkflowRunner::new(d, None).unwrap();
        let state = runner.run("   ", None).await.unwrap();
        assert_eq!(state.final_output.as_deref(), Some(EMPTY_REQUEST));
        assert!(state.plan.is_none());
        assert_eq!(planner.call_count(), 0);
    }

    /// **Scenario**: With a checkpointer, the run is saved by thread and continued later.
    #[tokio::test]
    async fn thread_is_saved_and_continued() {
        let saver: Arc<dyn Checkpointer<WorkflowState>> = Arc::new(MemorySaver::new());
        let runner = WorkflowRunner::new(
            deps(
                MockLlm::with_no_tool_calls(PLAN_JSON),
                MockLlm::with_no_tool_calls("Answer"),
            ),
            Some(saver),
        )
        .unwrap();
        runner.run("first", Some("t1")).await.unwrap();
        let saved = runner.load("t1").await.unwrap().unwrap();
        assert_eq!(saved.plan_iterations, 1);

        let second = runner.run("second", Some("t1")).await.unwrap();
        assert_eq!(second.plan_iterations, 2);
        assert_eq!(second.request(), "second");
        assert!(runner.load("other").await.unwrap().is_none());
    }

    /// **Scenario**: save/load without a checkpointer is refused.
    #[tokio::test]
    async fn save_requires_checkpointer() {
        let runner = WorkflowRunner::new(
            deps(MockLlm::with_no_tool_calls(""), MockLlm::with_no_tool_calls("")),
            None,
        )
        .unwrap();
        assert!(matches!(
            runner.save("r", &WorkflowState::new("x")).await,
            Err(WorkflowRunError::NoCheckpointer)
        ));
    }

    /// **Scenario**: Planner output that is not a plan still yields a posted fallback run.
    #[tokio::test]
    async fn unparsable_plan_falls_back() {
        let runner = WorkflowRunner::new(
            deps(
                MockLlm::with_no_tool_calls("no plan today"),
                MockLlm::with_no_tool_calls("Background text"),
            ),
            None,
        )
        .unwrap();
        let state = runner.run("cats", None).await.unwrap();
        assert_eq!(state.plan, Some(Plan::fallback("cats")));
        assert_eq!(
            state.composed.as_deref(),
            Some("[Planned Tweet] cats\nBackground text")
        );
    }

    /// **Scenario**: Two research subtasks with long answers run concurrently and the
    /// composed text over 280 characters still gets a dry-run id.
    #[tokio::test]
    async fn long_dry_run_post_succeeds() {
        let plan = r#"{"headline": "Rust news", "subtasks": [
            {"id": "r1", "kind": "research", "description": "editions"},
            {"id": "r2", "kind": "research", "description": "async"},
            {"id": "d1", "kind": "draw", "description": "crab"}]}"#;
        let answer = "x".repeat(170);
        let runner = WorkflowRunner::new(
            deps(
                MockLlm::with_no_tool_calls(plan),
                MockLlm::with_no_tool_calls(answer.clone()),
            ),
            None,
        )
        .unwrap();
        let state = runner.run("rust", None).await.unwrap();
        let composed = state.composed.as_deref().unwrap();
        assert!(composed.chars().count() > 280);
        assert!(composed.starts_with(&format!("Rust news\n{}\n{}\n[Image: ", answer, answer)));
        let id = state.publish_id.clone().unwrap();
        assert!(id.starts_with("dry-run-"));
        assert_eq!(state.final_output, Some(format!("Posted with ID: {}", id)));
    }
}
