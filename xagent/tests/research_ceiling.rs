//! The research loop always terminates, even against a model that never stops calling tools.

mod init_logging;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use xagent::tools::CylinderVolumeTool;
use xagent::{
    LoopLimits, MockLlm, ResearchHandler, SubTask, TaskKind, ToolCall, ToolLoop, ToolRegistry,
    WorkflowPrompts, UNRESOLVED_MARKER,
};

fn endless_tool_caller() -> MockLlm {
    MockLlm::new(
        "",
        vec![ToolCall {
            name: "calculate_cylinder_volume".into(),
            arguments: json!({"radius": 1, "height": 1}).to_string(),
            id: None,
        }],
    )
}

fn handler(llm: Arc<MockLlm>, max_rounds: usize) -> ResearchHandler {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CylinderVolumeTool));
    ResearchHandler::new(
        ToolLoop::new(
            llm,
            Arc::new(registry),
            LoopLimits {
                max_rounds,
                model_timeout: Duration::from_secs(5),
                tool_timeout: Duration::from_secs(5),
            },
        ),
        &WorkflowPrompts::embedded(),
    )
}

/// **Scenario**: A model that always requests a tool ends with the unresolved marker after
/// exactly `max_rounds` tool rounds.
#[tokio::test]
async fn always_tool_calling_model_hits_ceiling() {
    for max_rounds in [1usize, 3, 10] {
        let llm = Arc::new(endless_tool_caller());
        let result = handler(llm.clone(), max_rounds)
            .resolve(&SubTask::new("r1", TaskKind::Research, "loop forever"))
            .await;
        assert_eq!(result.id, "r1");
        assert_eq!(result.text, UNRESOLVED_MARKER);
        // one model call per round plus the final call that hits the ceiling
        assert_eq!(llm.call_count(), max_rounds + 1);
    }
}

/// **Scenario**: Every tool result is fed back before the next model call.
#[tokio::test]
async fn every_round_feeds_tool_result() {
    let llm = Arc::new(endless_tool_caller());
    handler(llm.clone(), 2)
        .resolve(&SubTask::new("r1", TaskKind::Research, "x"))
        .await;
    let calls = llm.calls();
    let last = calls.last().unwrap();
    let fed: Vec<&str> = last
        .iter()
        .map(|m| m.content())
        .filter(|c| c.starts_with("Tool calculate_cylinder_volume returned: "))
        .collect();
    assert_eq!(fed.len(), 2);
    assert!(fed.iter().all(|c| c.ends_with("3.14")));
}
