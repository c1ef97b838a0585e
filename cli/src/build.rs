//! Builds models, tools, publisher and the workflow runner from an [`AppConfig`].

use std::sync::Arc;

use env_config::{AgentRole, AppConfig, ConfigError};
use xagent::memory::Checkpointer;
use xagent::{
    default_registry, AskAgent, ChatOpenAI, CompilationError, DrawHandler, DryRunPublisher,
    LlmClient, LoopLimits, MemorySaver, Publisher, ResearchHandler, ToolLoop, ToolRegistry,
    ToolSource, ToolSourceError, TwitterPublisher, WorkflowDeps, WorkflowPrompts, WorkflowRunner,
    WorkflowState,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("tools: {0}")]
    Tools(#[from] ToolSourceError),
    #[error("workflow graph: {0}")]
    Compilation(#[from] CompilationError),
}

/// Model for `role` without tools bound.
pub fn plain_llm(config: &AppConfig, role: AgentRole) -> Result<Arc<dyn LlmClient>, BuildError> {
    let model = config.model_for(role)?;
    Ok(Arc::new(ChatOpenAI::from_model_config(model)))
}

/// Model for `role` with every tool of `tools` bound.
pub async fn tool_llm(
    config: &AppConfig,
    role: AgentRole,
    tools: &dyn ToolSource,
) -> Result<Arc<dyn LlmClient>, BuildError> {
    let model = config.model_for(role)?;
    Ok(Arc::new(ChatOpenAI::new_with_tool_source(model, tools).await?))
}

/// Twitter when a token is set and `dry_run` is off; the dry-run publisher otherwise.
pub fn publisher(config: &AppConfig, dry_run: bool) -> Arc<dyn Publisher> {
    if dry_run {
        return Arc::new(DryRunPublisher);
    }
    match TwitterPublisher::from_token(config.twitter_bearer_token.as_deref()) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to dry run");
            Arc::new(DryRunPublisher)
        }
    }
}

/// Tool loop over the default registry with the researcher's model.
async fn research_loop(config: &AppConfig, registry: ToolRegistry) -> Result<ToolLoop, BuildError> {
    let llm = tool_llm(config, AgentRole::Researcher, &registry).await?;
    Ok(ToolLoop::new(
        llm,
        Arc::new(registry),
        LoopLimits::from_config(config),
    ))
}

pub async fn workflow_runner(
    config: &AppConfig,
    prompts: WorkflowPrompts,
    dry_run: bool,
    with_checkpointer: bool,
) -> Result<WorkflowRunner, BuildError> {
    let tool_loop = research_loop(config, default_registry(config)).await?;
    let research =
        ResearchHandler::new(tool_loop, &prompts).with_concurrency(config.research.concurrency);
    let deps = WorkflowDeps {
        planner_llm: plain_llm(config, AgentRole::Planner)?,
        research,
        draw: DrawHandler::new(config.draw_base_url.clone()),
        publisher: publisher(config, dry_run),
        prompts,
        model_timeout: config.timeouts.model,
        publish_timeout: config.timeouts.publish,
        recursion_limit: config.recursion_limit,
    };
    let checkpointer = with_checkpointer
        .then(|| Arc::new(MemorySaver::<WorkflowState>::new()) as Arc<dyn Checkpointer<WorkflowState>>);
    Ok(WorkflowRunner::new(deps, checkpointer)?)
}

pub async fn ask_agent(config: &AppConfig, prompts: &WorkflowPrompts) -> Result<AskAgent, BuildError> {
    let tool_loop = research_loop(config, default_registry(config)).await?;
    Ok(AskAgent::new(tool_loop, prompts))
}
