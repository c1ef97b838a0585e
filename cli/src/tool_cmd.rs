//! `tools` subcommand: the tool specs the research and ask loops bind to the model.

use env_config::AppConfig;
use xagent::{default_registry, ToolSource, ToolSourceError, ToolSpec};

/// Longer descriptions are cut in the table.
const LIST_DESC_MAX_CHARS: usize = 60;

pub async fn tool_specs(config: &AppConfig) -> Result<Vec<ToolSpec>, ToolSourceError> {
    default_registry(config).list_tools().await
}

/// `NAME<TAB>DESCRIPTION` table, first description line only.
pub fn format_table(tools: &[ToolSpec]) -> String {
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(4).max(4);
    let mut out = format!("{:<width$}\tDESCRIPTION\n", "NAME", width = width);
    for spec in tools {
        let first_line = spec
            .description
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or("");
        let desc = if first_line.chars().count() > LIST_DESC_MAX_CHARS {
            let cut: String = first_line.chars().take(LIST_DESC_MAX_CHARS).collect();
            format!("{}...", cut)
        } else {
            first_line.to_string()
        };
        out.push_str(&format!("{:<width$}\t{}\n", spec.name, desc, width = width));
    }
    out
}
