use serde_json::{Map, Value};

/// Parses a model-supplied argument string into a JSON object.
///
/// Empty text, invalid JSON and non-object JSON all become `{}`; the latter two are logged.
pub fn parse_tool_arguments(tool: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => v,
        Ok(other) => {
            tracing::warn!(tool = %tool, arguments = %other, "tool arguments are not an object, using {{}}");
            Value::Object(Map::new())
        }
        Err(e) => {
            tracing::warn!(tool = %tool, arguments = %raw, error = %e, "invalid tool arguments, using {{}}");
            Value::Object(Map::new())
        }
    }
}
