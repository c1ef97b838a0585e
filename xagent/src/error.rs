//! Error type for graph nodes and model calls.

use std::time::Duration;

use thiserror::Error;

/// Failure of a node or of a model call.
///
/// Most pipeline degradations are recovered inside the nodes (fallback plan, in-band tool
/// errors, unresolved marker); what reaches the graph runner as `AgentError` aborts the run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM request rejected, invalid graph step).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// An external call did not finish within its deadline.
    #[error("{what} timed out after {}s", .after.as_secs_f64())]
    Timeout { what: String, after: Duration },
}

impl AgentError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }
}
