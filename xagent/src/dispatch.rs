//! Splits a plan into the research and draw work lists.

use crate::plan::{Plan, SubTask, TaskKind};

/// Subtasks per handler, each list in plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    pub research: Vec<SubTask>,
    pub draw: Vec<SubTask>,
}

impl Dispatch {
    pub fn is_empty(&self) -> bool {
        self.research.is_empty() && self.draw.is_empty()
    }
}

/// Partitions `plan.subtasks` by kind. Subtasks of any other kind are dropped with a warning.
pub fn dispatch(plan: &Plan) -> Dispatch {
    let mut out = Dispatch::default();
    for task in &plan.subtasks {
        match &task.kind {
            TaskKind::Research => out.research.push(task.clone()),
            TaskKind::Draw => out.draw.push(task.clone()),
            TaskKind::Other(kind) => {
                tracing::warn!(subtask_id = %task.id, %kind, "no handler for subtask kind, dropping")
            }
        }
    }
    tracing::debug!(
        research = out.research.len(),
        draw = out.draw.len(),
        "dispatched plan"
    );
    out
}
