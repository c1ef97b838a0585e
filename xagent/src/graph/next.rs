//! Routing decision returned by a node.

/// What the runner does after a node.
///
/// - **Continue**: follow the node's outgoing edge (END if none).
/// - **Node(id)**: jump to `id`.
/// - **End**: stop and return the current state.
///
/// Ignored when the node has conditional edges; the router decides instead.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
