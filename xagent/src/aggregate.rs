//! Composes the post text from a plan and its handler results.

use std::collections::HashMap;

use crate::draw::DrawResult;
use crate::plan::{Plan, TaskKind};
use crate::research::ResearchResult;

/// Headline, then research texts in plan order, then `[Image: ref]` for the first draw result
/// in plan order, joined by `"\n"`.
///
/// Results are looked up by subtask id, so arrival order does not matter. Ids not in the plan
/// are ignored; for a repeated id the first result wins. Empty parts are skipped.
pub fn assemble(plan: &Plan, research: &[ResearchResult], draws: &[DrawResult]) -> String {
    let mut research_by_id: HashMap<&str, &str> = HashMap::new();
    for r in research {
        research_by_id.entry(r.id.as_str()).or_insert(r.text.as_str());
    }
    let mut draw_by_id: HashMap<&str, &str> = HashMap::new();
    for d in draws {
        draw_by_id.entry(d.id.as_str()).or_insert(d.image_ref.as_str());
    }

    let mut lines: Vec<String> = Vec::new();
    if !plan.headline.trim().is_empty() {
        lines.push(plan.headline.clone());
    }
    lines.extend(
        plan.subtasks
            .iter()
            .filter(|t| t.kind == TaskKind::Research)
            .filter_map(|t| research_by_id.get(t.id.as_str()))
            .filter(|text| !text.trim().is_empty())
            .map(|text| text.to_string()),
    );
    let first_image = plan
        .subtasks
        .iter()
        .filter(|t| t.kind == TaskKind::Draw)
        .find_map(|t| draw_by_id.get(t.id.as_str()));
    if let Some(image) = first_image {
        lines.push(format!("[Image: {}]", image));
    }

    let ignored = research
        .iter()
        .map(|r| r.id.as_str())
        .chain(draws.iter().map(|d| d.id.as_str()))
        .filter(|id| plan.position(id).is_none())
        .count();
    if ignored > 0 {
        tracing::warn!(ignored, "results for ids not in the plan were dropped");
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SubTask;

    fn plan() -> Plan {
        Plan {
            headline: "T".into(),
            subtasks: vec![
                SubTask::new("r1", TaskKind::Research, "X"),
                SubTask::new("d1", TaskKind::Draw, "Y"),
                SubTask::new("r2", TaskKind::Research, "Z"),
                SubTask::new("d2", TaskKind::Draw, "W"),
            ],
        }
    }

    fn r(id: &str, text: &str) -> ResearchResult {
        ResearchResult {
            id: id.into(),
            text: text.into(),
        }
    }

    fn d(id: &str, image_ref: &str) -> DrawResult {
        DrawResult {
            id: id.into(),
            image_ref: image_ref.into(),
        }
    }

    /// **Scenario**: Research lines follow plan order even when results arrive reversed; only
    /// the first draw in plan order is attached.
    #[test]
    fn plan_order_not_arrival_order() {
        let out = assemble(
            &plan(),
            &[r("r2", "second"), r("r1", "first")],
            &[d("d2", "img2"), d("d1", "img1")],
        );
        assert_eq!(out, "T\nfirst\nsecond\n[Image: img1]");
    }

    /// **Scenario**: Unknown ids are ignored and a repeated id keeps its first result.
    #[test]
    fn unknown_and_duplicate_ids() {
        let out = assemble(
            &plan(),
            &[r("zz", "stray"), r("r1", "kept"), r("r1", "dropped")],
            &[d("x9", "stray-img")],
        );
        assert_eq!(out, "T\nkept");
    }

    /// **Scenario**: Empty headline and empty research texts leave no blank lines.
    #[test]
    fn empty_parts_skipped() {
        let mut p = plan();
        p.headline = String::new();
        let out = assemble(&p, &[r("r1", ""), r("r2", "only")], &[]);
        assert_eq!(out, "only");
    }
}
