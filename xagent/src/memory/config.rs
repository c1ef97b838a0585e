//! Per-invoke config: which thread to checkpoint under.

/// Identifies the thread (run) and optionally one of its checkpoints.
///
/// `CompiledStateGraph::invoke` saves the final state only when `thread_id` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    pub thread_id: Option<String>,
    /// Load this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
}

impl RunnableConfig {
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            checkpoint_id: None,
        }
    }
}
