//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. When a checkpointer is set and
//! `config.thread_id` is provided, the final state is saved after invoke.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_route,
};
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the START node; after each node the conditional router (when present) or the
/// node's returned `Next` picks the successor.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) first_node_id: String,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => Some(router.resolve_next(state)),
            entry => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                    _ => None,
                },
            },
        }
    }

    async fn save_final(&self, state: &S, config: Option<&RunnableConfig>, steps: usize) {
        let (Some(cp), Some(cfg)) = (&self.checkpointer, config) else {
            return;
        };
        if cfg.thread_id.is_none() {
            return;
        }
        let checkpoint = Checkpoint::from_state(state.clone(), CheckpointSource::Update, steps as i64);
        if let Err(e) = cp.put(cfg, &checkpoint).await {
            tracing::warn!(error = %e, thread_id = ?cfg.thread_id, "failed to save checkpoint");
        }
    }

    /// Runs the graph with the given state until a node ends the run or routes to END.
    ///
    /// - `Next::Continue`: follow the node's edge, or end when it has none.
    /// - `Next::Node(id)`: run the node with that id next.
    /// - `Next::End`: stop and return current state.
    ///
    /// Fails with `ExecutionFailed` when more than `recursion_limit` node runs would be needed
    /// or a route names an unknown node.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        log_graph_start();

        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;

        loop {
            if steps >= self.recursion_limit {
                let e = AgentError::ExecutionFailed(format!(
                    "recursion limit of {} reached without hitting END",
                    self.recursion_limit
                ));
                log_graph_error(&e);
                return Err(e);
            }
            let node = match self.nodes.get(&current_id) {
                Some(n) => n.clone(),
                None => {
                    let e = AgentError::ExecutionFailed(format!("unknown node: {}", current_id));
                    log_graph_error(&e);
                    return Err(e);
                }
            };

            log_node_start(&current_id);
            log_node_state(&current_id, &state);

            let (new_state, next) = match node.run(state.clone()).await {
                Ok(output) => output,
                Err(e) => {
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            steps += 1;
            log_node_complete(&current_id, &next);
            state = new_state;

            match self.resolve_next(&current_id, &state, next) {
                Some(id) if id != END => {
                    log_route(&current_id, &id);
                    current_id = id;
                }
                _ => {
                    log_route(&current_id, END);
                    self.save_final(&state, config.as_ref(), steps).await;
                    log_graph_complete(steps);
                    return Ok(state);
                }
            }
        }
    }

    /// Latest saved state for `config.thread_id`, or `None` without a checkpointer.
    pub async fn get_state(&self, config: &RunnableConfig) -> Result<Option<S>, AgentError> {
        let Some(cp) = &self.checkpointer else {
            return Ok(None);
        };
        let tuple = cp
            .get_tuple(config)
            .await
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        Ok(tuple.map(|(checkpoint, _)| checkpoint.state))
    }
}
