//! Errors from [`StateGraph::compile`](super::StateGraph::compile).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge names a node that was never added (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("graph must have exactly one edge from START")]
    MissingStart,

    #[error("graph has no path to END")]
    MissingEnd,

    /// Branching plain edges or a cycle without a conditional edge.
    #[error("edges must form a single linear chain from START to END: {0}")]
    InvalidChain(String),

    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display strings name the offending node or the broken rule.
    #[test]
    fn display_mentions_cause() {
        assert!(CompilationError::NodeNotFound("poster".into())
            .to_string()
            .contains("poster"));
        assert!(CompilationError::MissingStart.to_string().contains("START"));
        assert!(CompilationError::MissingEnd.to_string().contains("END"));
        assert!(CompilationError::InvalidChain("cycle detected".into())
            .to_string()
            .contains("cycle detected"));
    }
}
