//! Plan model and the parser that turns planner output into a [`Plan`].
//!
//! The parser never fails: anything it cannot read becomes [`Plan::fallback`] for the request.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a subtask. `Other` only exists for plans built in code; the parser rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    Research,
    Draw,
    Other(String),
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::Research => "research",
            TaskKind::Draw => "draw",
            TaskKind::Other(s) => s,
        }
    }
}

impl From<String> for TaskKind {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "research" => TaskKind::Research,
            "draw" => TaskKind::Draw,
            _ => TaskKind::Other(s),
        }
    }
}

impl From<TaskKind> for String {
    fn from(k: TaskKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub kind: TaskKind,
    pub description: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl SubTask {
    pub fn new(id: impl Into<String>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            params: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub headline: String,
    pub subtasks: Vec<SubTask>,
}

impl Plan {
    /// One research subtask about the request.
    pub fn fallback(request: &str) -> Self {
        Self {
            headline: format!("[Planned Tweet] {}", request),
            subtasks: vec![SubTask::new(
                "r1",
                TaskKind::Research,
                format!("Background for: {}", request),
            )],
        }
    }

    /// Position of `id` in `subtasks`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.subtasks.iter().position(|t| t.id == id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlanError {
    #[error("plan is not valid JSON: {0}")]
    Decode(String),
    #[error("subtask {index}: missing or invalid field '{field}'")]
    MissingField { index: usize, field: &'static str },
    #[error("subtask {id}: unknown kind '{kind}'")]
    UnknownKind { id: String, kind: String },
}

#[derive(Deserialize)]
struct RawPlan {
    #[serde(alias = "tweet_text")]
    headline: Option<String>,
    subtasks: Vec<RawSubTask>,
}

#[derive(Deserialize)]
struct RawSubTask {
    id: Option<Value>,
    #[serde(alias = "type")]
    kind: Option<String>,
    description: Option<String>,
    params: Option<Value>,
}

/// Removes one surrounding ``` fence (with optional language tag) if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // language tag runs to the end of the first line
    let body = match rest.find('\n') {
        Some(nl) if rest[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => &rest[nl + 1..],
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn decode(raw: &str) -> Result<RawPlan, PlanError> {
    let text = strip_code_fence(raw);
    match serde_json::from_str::<RawPlan>(text) {
        Ok(plan) => Ok(plan),
        Err(first) => {
            // prose around the object: retry on the outermost braces
            let inner = match (text.find('{'), text.rfind('}')) {
                (Some(start), Some(end)) if start < end => &text[start..=end],
                _ => return Err(PlanError::Decode(first.to_string())),
            };
            serde_json::from_str::<RawPlan>(inner).map_err(|_| PlanError::Decode(first.to_string()))
        }
    }
}

fn normalize_id(id: Option<Value>) -> Option<String> {
    match id? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Strict parse: every subtask needs an id, a known kind and a description.
///
/// A missing headline becomes `request`. Repeated ids keep the first subtask.
pub fn try_parse_plan(raw: &str, request: &str) -> Result<Plan, PlanError> {
    let decoded = decode(raw)?;
    let mut seen = HashSet::new();
    let mut subtasks = Vec::with_capacity(decoded.subtasks.len());

    for (index, st) in decoded.subtasks.into_iter().enumerate() {
        let id = normalize_id(st.id).ok_or(PlanError::MissingField { index, field: "id" })?;
        let kind = st
            .kind
            .map(TaskKind::from)
            .ok_or(PlanError::MissingField { index, field: "kind" })?;
        if let TaskKind::Other(kind) = kind {
            return Err(PlanError::UnknownKind { id, kind });
        }
        let description = st.description.ok_or(PlanError::MissingField {
            index,
            field: "description",
        })?;
        let params = match st.params {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(m)) => m,
            Some(_) => {
                return Err(PlanError::MissingField {
                    index,
                    field: "params",
                })
            }
        };
        if !seen.insert(id.clone()) {
            tracing::warn!(subtask_id = %id, index, "duplicate subtask id, keeping the first");
            continue;
        }
        subtasks.push(SubTask {
            id,
            kind,
            description,
            params,
        });
    }

    let headline = decoded
        .headline
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| request.to_string());
    Ok(Plan { headline, subtasks })
}

/// Lenient parse used by the pipeline: any error yields [`Plan::fallback`].
pub fn parse_plan(raw: &str, request: &str) -> Plan {
    match try_parse_plan(raw, request) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!(error = %e, "planner output unusable, using fallback plan");
            Plan::fallback(request)
        }
    }
}
