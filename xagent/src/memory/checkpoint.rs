//! Checkpoint and metadata types.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Where a checkpoint came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Saved from the input to invoke.
    #[default]
    Input,
    /// Saved at the end of a graph run.
    Update,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Node runs completed when the checkpoint was taken.
    pub step: i64,
}

/// A saved state snapshot.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    /// UUID v4.
    pub id: String,
    /// RFC 3339 UTC timestamp.
    pub ts: String,
    pub state: S,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    pub fn from_state(state: S, source: CheckpointSource, step: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            state,
            metadata: CheckpointMetadata { source, step },
        }
    }
}

/// Entry returned by `Checkpointer::list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: from_state gives a v4 uuid, a parseable timestamp and the given metadata.
    #[test]
    fn from_state_fills_id_and_ts() {
        let cp = Checkpoint::from_state(7u32, CheckpointSource::Update, 4);
        let id = Uuid::parse_str(&cp.id).unwrap();
        assert_eq!(id.get_version_num(), 4);
        assert!(chrono::DateTime::parse_from_rfc3339(&cp.ts).is_ok());
        assert_eq!(cp.state, 7);
        assert_eq!(
            cp.metadata,
            CheckpointMetadata {
                source: CheckpointSource::Update,
                step: 4
            }
        );
    }

    /// **Scenario**: Two checkpoints never share an id.
    #[test]
    fn ids_are_unique() {
        let a = Checkpoint::from_state((), CheckpointSource::Input, 0);
        let b = Checkpoint::from_state((), CheckpointSource::Input, 0);
        assert_ne!(a.id, b.id);
    }
}
