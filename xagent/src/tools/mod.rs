//! Built-in tools and the registry that maps tool names to them.
//!
//! Tools implement [`Tool`]; [`ToolRegistry`] holds them by name and implements
//! [`ToolSource`](crate::tool_source::ToolSource). [`default_registry`] wires the built-ins from
//! an [`AppConfig`].

mod args;
mod crawl;
mod cylinder;
mod registry;
pub mod search;
mod r#trait;
mod weather;

use env_config::AppConfig;

pub use args::parse_tool_arguments;
pub use crawl::{CrawlTool, TOOL_CRAWL};
pub use cylinder::{cylinder_volume, CylinderVolumeTool, TOOL_CYLINDER_VOLUME};
pub use r#trait::Tool;
pub use registry::ToolRegistry;
pub use search::{WebSearchTool, TOOL_WEB_SEARCH};
pub use weather::{WeatherTool, TOOL_GET_CURRENT_WEATHER};

/// Registry with weather, cylinder volume, web search and crawl.
pub fn default_registry(config: &AppConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WeatherTool::new(config.openweather_api_key.clone())));
    registry.register(Box::new(CylinderVolumeTool));
    registry.register(Box::new(WebSearchTool::from_settings(&config.search)));
    registry.register(Box::new(CrawlTool::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_source::ToolSource;

    /// **Scenario**: The default registry exposes the four built-in tools by name.
    #[tokio::test]
    async fn default_registry_lists_builtins() {
        let registry = default_registry(&AppConfig::default());
        let mut names: Vec<String> = registry
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                TOOL_CYLINDER_VOLUME,
                TOOL_CRAWL,
                TOOL_GET_CURRENT_WEATHER,
                TOOL_WEB_SEARCH
            ]
        );
    }
}
