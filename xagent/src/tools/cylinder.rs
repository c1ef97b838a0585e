//! Cylinder volume, the classic function-calling demo.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_CYLINDER_VOLUME: &str = "calculate_cylinder_volume";

const NOT_POSITIVE: &str = "Radius and height must be positive numbers.";

/// π·r²·h rounded to two decimals; `None` unless both inputs are positive.
pub fn cylinder_volume(radius: f64, height: f64) -> Option<f64> {
    if !(radius > 0.0 && height > 0.0) {
        return None;
    }
    let volume = std::f64::consts::PI * radius * radius * height;
    Some((volume * 100.0).round() / 100.0)
}

pub struct CylinderVolumeTool;

fn number_arg(args: &Value, key: &str) -> Result<f64, ToolSourceError> {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ToolSourceError::InvalidInput(format!("'{}' is not a number", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ToolSourceError::InvalidInput(format!("'{}' is not a number", key))),
        _ => Err(ToolSourceError::InvalidInput(format!("missing '{}'", key))),
    }
}

#[async_trait]
impl Tool for CylinderVolumeTool {
    fn name(&self) -> &str {
        TOOL_CYLINDER_VOLUME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_CYLINDER_VOLUME.to_string(),
            description: Some("Calculate the volume of a cylinder given radius and height.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "radius": {"type": "number", "description": "Radius of the cylinder (in units)"},
                    "height": {"type": "number", "description": "Height of the cylinder (in units)"}
                },
                "required": ["radius", "height"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let radius = number_arg(&args, "radius")?;
        let height = number_arg(&args, "height")?;
        let text = match cylinder_volume(radius, height) {
            Some(v) => v.to_string(),
            None => NOT_POSITIVE.to_string(),
        };
        Ok(ToolCallContent { text })
    }
}
