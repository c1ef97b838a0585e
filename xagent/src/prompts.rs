//! Prompt templates and the `{placeholder}` renderer.
//!
//! Default text lives in `xagent/prompts/workflow.yaml` and is embedded at compile time.
//! A `workflow.yaml` in `PROMPTS_DIR` (or an explicit directory) overrides it field by field.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

const EMBED_WORKFLOW: &str = include_str!("../prompts/workflow.yaml");

const WORKFLOW_FILE: &str = "workflow.yaml";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct PromptsFile {
    planner: Option<String>,
    researcher: Option<String>,
    research_task: Option<String>,
    ask: Option<String>,
}

/// Resolved templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPrompts {
    /// User prompt for the planner; `{request}`.
    pub planner: String,
    /// System prompt for research subtasks.
    pub researcher: String,
    /// Per-subtask user prompt; `{description}`, `{params}`.
    pub research_task: String,
    /// System prompt for ask mode.
    pub ask: String,
}

impl Default for WorkflowPrompts {
    fn default() -> Self {
        Self::embedded()
    }
}

impl WorkflowPrompts {
    pub fn embedded() -> Self {
        let file: PromptsFile = serde_yaml::from_str(EMBED_WORKFLOW).unwrap_or_default();
        Self {
            planner: file.planner.unwrap_or_default(),
            researcher: file.researcher.unwrap_or_default(),
            research_task: file.research_task.unwrap_or_default(),
            ask: file.ask.unwrap_or_default(),
        }
    }

    fn overlay(mut self, file: PromptsFile) -> Self {
        if let Some(s) = file.planner {
            self.planner = s;
        }
        if let Some(s) = file.researcher {
            self.researcher = s;
        }
        if let Some(s) = file.research_task {
            self.research_task = s;
        }
        if let Some(s) = file.ask {
            self.ask = s;
        }
        self
    }

    /// Embedded prompts overlaid with `workflow.yaml` from `dir`, else from `PROMPTS_DIR`.
    ///
    /// A missing directory or file keeps the embedded text; an unreadable or invalid file is
    /// an error.
    pub fn load(dir: Option<&Path>) -> Result<Self, LoadError> {
        let base = dir
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("PROMPTS_DIR").map(PathBuf::from));
        let Some(base) = base else {
            return Ok(Self::embedded());
        };
        let path = base.join(WORKFLOW_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::embedded()),
            Err(e) => {
                return Err(LoadError::ReadFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        let file: PromptsFile = serde_yaml::from_str(&content).map_err(|e| LoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded prompt overrides");
        Ok(Self::embedded().overlay(file))
    }

    pub fn load_or_default(dir: Option<&Path>) -> Self {
        Self::load(dir).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using embedded prompts");
            Self::embedded()
        })
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Replaces each `{name}` with `vars[name]`; placeholders without a value stay as written.
pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(v) => v.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Known placeholders are filled; unknown ones and JSON braces are untouched.
    #[test]
    fn render_fills_known_only() {
        let vars = HashMap::from([("request", "post about Rust".to_string())]);
        let out = render(r#"Req: {request} / {missing} / {"headline": 1} / {}"#, &vars);
        assert_eq!(out, r#"Req: post about Rust / {missing} / {"headline": 1} / {}"#);
    }

    /// **Scenario**: Embedded YAML yields every template, with the research task layout.
    #[test]
    fn embedded_prompts_parse() {
        let p = WorkflowPrompts::embedded();
        assert!(p.planner.contains("{request}"));
        assert!(!p.researcher.is_empty());
        assert!(!p.ask.is_empty());
        assert_eq!(
            p.research_task,
            "# Task\n\n## Title\n\n{description}\n\n## Params\n{params}"
        );
    }

    /// **Scenario**: An override file replaces only the fields it sets.
    #[test]
    fn override_file_overlays() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WORKFLOW_FILE), "ask: be brief\n").unwrap();
        let p = WorkflowPrompts::load(Some(dir.path())).unwrap();
        assert_eq!(p.ask, "be brief");
        assert_eq!(p.planner, WorkflowPrompts::embedded().planner);
    }

    /// **Scenario**: A directory without workflow.yaml keeps the embedded text; bad YAML errors.
    #[test]
    fn missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            WorkflowPrompts::load(Some(dir.path())).unwrap(),
            WorkflowPrompts::embedded()
        );
        std::fs::write(dir.path().join(WORKFLOW_FILE), "ask: [unclosed").unwrap();
        assert!(matches!(
            WorkflowPrompts::load(Some(dir.path())),
            Err(LoadError::ParseYaml { .. })
        ));
    }
}
