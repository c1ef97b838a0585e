//! The posting workflow: coordinator → planner → research_team → poster.

mod nodes;
mod runner;
mod state;

pub use nodes::{
    CoordinatorNode, PlannerNode, PosterNode, ResearchTeamNode, COORDINATOR, EMPTY_REQUEST,
    PLANNER, POSTER, RESEARCH_TEAM,
};
pub use runner::{WorkflowDeps, WorkflowRunError, WorkflowRunner};
pub use state::WorkflowState;
