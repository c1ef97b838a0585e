//! # xagent
//!
//! A plan → research → draw → post workflow for X (Twitter), plus a small function-calling
//! "ask" agent, built on a state-in, state-out graph.
//!
//! ## Pipeline
//!
//! `coordinator → planner → research_team → poster`, one [`WorkflowState`] threaded through:
//!
//! - [`plan`]: the planner's model output becomes a [`Plan`]; unusable output becomes
//!   [`Plan::fallback`].
//! - [`dispatch`]: subtasks are split by kind, keeping plan order.
//! - [`research`]: each research subtask runs a bounded model/tool loop ([`ToolLoop`]).
//! - [`draw`]: each draw subtask gets a stable image reference.
//! - [`aggregate`]: the post text is assembled in plan order and handed to a [`Publisher`].
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`].
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`RunnableConfig`].
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`].
//! - [`tools`]: weather, cylinder volume, web search and crawl in a [`ToolRegistry`].
//! - [`workflow`]: [`WorkflowRunner`] and its nodes.
//! - [`ask`]: [`AskAgent`], one question through the same tool loop.

pub mod aggregate;
pub mod ask;
pub mod dispatch;
pub mod draw;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod plan;
pub mod prompts;
pub mod publisher;
pub mod research;
pub mod tool_source;
pub mod tools;
pub mod workflow;

pub use aggregate::assemble;
pub use ask::AskAgent;
pub use dispatch::{dispatch, Dispatch};
pub use draw::{image_ref, DrawHandler, DrawResult, ImageGenerator, DEFAULT_DRAW_BASE_URL};
pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, MockLlm, ToolCall, ToolChoiceMode};
pub use memory::{Checkpoint, Checkpointer, MemorySaver, RunnableConfig};
pub use message::{Message, Role};
pub use plan::{parse_plan, try_parse_plan, Plan, PlanError, SubTask, TaskKind};
pub use prompts::WorkflowPrompts;
pub use publisher::{
    publish_with_timeout, DryRunPublisher, PublishError, Publisher, TwitterPublisher,
};
pub use research::{
    LoopLimits, LoopOutcome, ResearchHandler, ResearchResult, ToolLoop, UNRESOLVED_MARKER,
};
pub use tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{default_registry, ToolRegistry};
pub use workflow::{WorkflowDeps, WorkflowRunError, WorkflowRunner, WorkflowState};
