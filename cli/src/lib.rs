//! Library side of the `xagent` binary: wiring from config to runnable components.

pub mod build;
pub mod tool_cmd;

pub use build::{ask_agent, plain_llm, publisher, tool_llm, workflow_runner, BuildError};
pub use tool_cmd::{format_table, tool_specs};
