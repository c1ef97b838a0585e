//! Typed application config: model per role, agent-to-role map, timeouts, research and
//! search settings, tool and publisher credentials.
//!
//! Built once with [`AppConfig::from_env`] after [`crate::load_and_apply`]. Tests use
//! [`AppConfig::from_lookup`] with a map so the process environment is never touched.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BASIC_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESEARCH_MAX_ROUNDS: usize = 10;
const DEFAULT_RESEARCH_CONCURRENCY: usize = 4;
const DEFAULT_RECURSION_LIMIT: usize = 25;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 3;
const DEFAULT_DRAW_BASE_URL: &str = "http://fakeimg.com";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("no model configured for llm type '{0}'")]
    MissingModel(LlmType),
}

/// Logical model class an agent runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmType {
    #[default]
    Basic,
    Reasoning,
    Vision,
}

impl LlmType {
    fn env_prefix(self) -> &'static str {
        match self {
            LlmType::Basic => "BASIC",
            LlmType::Reasoning => "REASONING",
            LlmType::Vision => "VISION",
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LlmType::Basic => "basic",
            LlmType::Reasoning => "reasoning",
            LlmType::Vision => "vision",
        };
        f.write_str(s)
    }
}

impl FromStr for LlmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "reasoning" => Ok(Self::Reasoning),
            "vision" => Ok(Self::Vision),
            other => Err(format!("unknown llm type: {}", other)),
        }
    }
}

/// Connection settings for one chat-completion model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model: String,
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL, e.g. `https://api.deepseek.com/v1`.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmRoles {
    pub basic: Option<ModelConfig>,
    pub reasoning: Option<ModelConfig>,
    pub vision: Option<ModelConfig>,
}

impl LlmRoles {
    pub fn get(&self, llm_type: LlmType) -> Option<&ModelConfig> {
        match llm_type {
            LlmType::Basic => self.basic.as_ref(),
            LlmType::Reasoning => self.reasoning.as_ref(),
            LlmType::Vision => self.vision.as_ref(),
        }
    }
}

/// Agents that talk to a model: the planner, and the researcher (also used by `ask`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Planner,
    Researcher,
}

impl AgentRole {
    fn env_key(self) -> &'static str {
        match self {
            AgentRole::Planner => "PLANNER_LLM_TYPE",
            AgentRole::Researcher => "RESEARCHER_LLM_TYPE",
        }
    }
}

/// Which [`LlmType`] each agent uses. Everything is `basic` unless overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentLlmMap {
    pub planner: LlmType,
    pub researcher: LlmType,
}

impl AgentLlmMap {
    pub fn for_agent(&self, role: AgentRole) -> LlmType {
        match role {
            AgentRole::Planner => self.planner,
            AgentRole::Researcher => self.researcher,
        }
    }

    fn slot(&mut self, role: AgentRole) -> &mut LlmType {
        match role {
            AgentRole::Planner => &mut self.planner,
            AgentRole::Researcher => &mut self.researcher,
        }
    }
}

/// Wall-clock limits for each kind of external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub model: Duration,
    pub tool: Duration,
    pub publish: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            model: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            tool: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            publish: Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchSettings {
    /// Tool-call rounds allowed per research subtask before giving up.
    pub max_rounds: usize,
    /// Research subtasks resolved at the same time.
    pub concurrency: usize,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_RESEARCH_MAX_ROUNDS,
            concurrency: DEFAULT_RESEARCH_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Engine names in query order (`tavily`, `duckduckgo`, `arxiv`, `brave`).
    pub engines: Vec<String>,
    pub max_results: usize,
    pub tavily_api_key: Option<String>,
    pub brave_api_key: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engines: vec!["tavily".to_string()],
            max_results: DEFAULT_SEARCH_MAX_RESULTS,
            tavily_api_key: None,
            brave_api_key: None,
        }
    }
}

/// Everything the workflow needs from the outside world, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub llm: LlmRoles,
    pub agent_llm: AgentLlmMap,
    pub timeouts: Timeouts,
    pub research: ResearchSettings,
    pub search: SearchSettings,
    /// Upper bound on graph steps per run.
    pub recursion_limit: usize,
    pub openweather_api_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub draw_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmRoles::default(),
            agent_llm: AgentLlmMap::default(),
            timeouts: Timeouts::default(),
            research: ResearchSettings::default(),
            search: SearchSettings::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            openweather_api_key: None,
            twitter_bearer_token: None,
            draw_base_url: DEFAULT_DRAW_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm = LlmRoles {
            basic: basic_model(&get),
            reasoning: role_model(&get, LlmType::Reasoning),
            vision: role_model(&get, LlmType::Vision),
        };

        let mut agent_llm = AgentLlmMap::default();
        for role in [AgentRole::Planner, AgentRole::Researcher] {
            if let Some(raw) = get(role.env_key()) {
                *agent_llm.slot(role) = raw.parse().map_err(|_| ConfigError::Invalid {
                    key: role.env_key().to_string(),
                    value: raw.clone(),
                })?;
            }
        }

        let timeouts = Timeouts {
            model: secs(&get, "MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT_SECS)?,
            tool: secs(&get, "TOOL_TIMEOUT_SECS", DEFAULT_TOOL_TIMEOUT_SECS)?,
            publish: secs(&get, "PUBLISH_TIMEOUT_SECS", DEFAULT_PUBLISH_TIMEOUT_SECS)?,
        };

        let research = ResearchSettings {
            max_rounds: positive(&get, "RESEARCH_MAX_ROUNDS", DEFAULT_RESEARCH_MAX_ROUNDS)?,
            concurrency: positive(&get, "RESEARCH_CONCURRENCY", DEFAULT_RESEARCH_CONCURRENCY)?,
        };

        let engines = get("SEARCH_API")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| SearchSettings::default().engines);
        let search = SearchSettings {
            engines,
            max_results: positive(&get, "SEARCH_MAX_RESULTS", DEFAULT_SEARCH_MAX_RESULTS)?,
            tavily_api_key: get("TAVILY_API_KEY"),
            brave_api_key: get("BRAVE_API_KEY"),
        };

        Ok(Self {
            llm,
            agent_llm,
            timeouts,
            research,
            search,
            recursion_limit: positive(&get, "AGENT_RECURSION_LIMIT", DEFAULT_RECURSION_LIMIT)?,
            openweather_api_key: get("OPENWEATHER_API_KEY"),
            twitter_bearer_token: get("TWITTER_BEARER_TOKEN"),
            draw_base_url: get("DRAW_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DRAW_BASE_URL.to_string()),
        })
    }

    /// Model settings for an agent, following the agent-to-role map.
    pub fn model_for(&self, role: AgentRole) -> Result<&ModelConfig, ConfigError> {
        let llm_type = self.agent_llm.for_agent(role);
        self.llm
            .get(llm_type)
            .ok_or(ConfigError::MissingModel(llm_type))
    }
}

/// `BASIC_*` with `OPENAI_*` as fallback. A key without a model name gets the default model.
fn basic_model(get: &impl Fn(&str) -> Option<String>) -> Option<ModelConfig> {
    let model = get("BASIC_MODEL").or_else(|| get("OPENAI_MODEL"));
    let api_key = get("BASIC_API_KEY").or_else(|| get("OPENAI_API_KEY"));
    let base_url = get("BASIC_BASE_URL")
        .or_else(|| get("OPENAI_BASE_URL"))
        .or_else(|| get("OPENAI_API_BASE"));
    if model.is_none() && api_key.is_none() {
        return None;
    }
    Some(ModelConfig {
        model: model.unwrap_or_else(|| DEFAULT_BASIC_MODEL.to_string()),
        api_key,
        base_url,
    })
}

fn role_model(get: &impl Fn(&str) -> Option<String>, llm_type: LlmType) -> Option<ModelConfig> {
    let prefix = llm_type.env_prefix();
    let model = get(&format!("{}_MODEL", prefix))?;
    Some(ModelConfig {
        model,
        api_key: get(&format!("{}_API_KEY", prefix)),
        base_url: get(&format!("{}_BASE_URL", prefix)),
    })
}

fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
        },
    }
}

fn secs(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    positive(get, key, default as usize).map(|n| Duration::from_secs(n as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    /// **Scenario**: An empty environment yields the documented defaults and no models.
    #[test]
    fn empty_lookup_gives_defaults() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.research.max_rounds, 10);
        assert_eq!(cfg.search.engines, vec!["tavily".to_string()]);
        assert_eq!(cfg.search.max_results, 3);
        assert_eq!(cfg.recursion_limit, 25);
        assert_eq!(cfg.timeouts.model, Duration::from_secs(60));
        assert!(cfg.llm.basic.is_none());
        assert_eq!(
            cfg.model_for(AgentRole::Planner),
            Err(ConfigError::MissingModel(LlmType::Basic))
        );
    }

    /// **Scenario**: OPENAI_* fills the basic role when BASIC_* is absent.
    #[test]
    fn openai_vars_fill_basic_role() {
        let cfg = config_from(&[
            ("OPENAI_API_KEY", "sk-x"),
            ("OPENAI_BASE_URL", "https://api.deepseek.com/v1"),
        ])
        .unwrap();
        let basic = cfg.model_for(AgentRole::Researcher).unwrap();
        assert_eq!(basic.model, "gpt-4o-mini");
        assert_eq!(basic.api_key.as_deref(), Some("sk-x"));
        assert_eq!(basic.base_url.as_deref(), Some("https://api.deepseek.com/v1"));
    }

    /// **Scenario**: An agent mapped to the reasoning role resolves to the REASONING_* model.
    #[test]
    fn agent_map_routes_to_reasoning() {
        let cfg = config_from(&[
            ("BASIC_MODEL", "deepseek-chat"),
            ("REASONING_MODEL", "deepseek-reasoner"),
            ("PLANNER_LLM_TYPE", "Reasoning"),
        ])
        .unwrap();
        assert_eq!(cfg.agent_llm.planner, LlmType::Reasoning);
        assert_eq!(cfg.model_for(AgentRole::Planner).unwrap().model, "deepseek-reasoner");
        assert_eq!(cfg.model_for(AgentRole::Researcher).unwrap().model, "deepseek-chat");
        assert!(cfg.llm.vision.is_none());
    }

    /// **Scenario**: Only the planner and researcher have a model slot; other agent keys are ignored.
    #[test]
    fn only_model_backed_agents_are_mapped() {
        let cfg = config_from(&[
            ("DRAWER_LLM_TYPE", "huge"),
            ("COORDINATOR_LLM_TYPE", "vision"),
            ("RESEARCHER_LLM_TYPE", "vision"),
        ])
        .unwrap();
        assert_eq!(
            cfg.agent_llm,
            AgentLlmMap {
                planner: LlmType::Basic,
                researcher: LlmType::Vision,
            }
        );
    }

    /// **Scenario**: Zero or non-numeric limits are rejected with the offending key.
    #[test]
    fn invalid_numbers_are_rejected() {
        assert_eq!(
            config_from(&[("RESEARCH_MAX_ROUNDS", "0")]),
            Err(ConfigError::Invalid {
                key: "RESEARCH_MAX_ROUNDS".into(),
                value: "0".into()
            })
        );
        assert!(matches!(
            config_from(&[("AGENT_RECURSION_LIMIT", "lots")]),
            Err(ConfigError::Invalid { key, .. }) if key == "AGENT_RECURSION_LIMIT"
        ));
        assert!(matches!(
            config_from(&[("RESEARCHER_LLM_TYPE", "huge")]),
            Err(ConfigError::Invalid { key, .. }) if key == "RESEARCHER_LLM_TYPE"
        ));
    }

    /// **Scenario**: SEARCH_API is a comma list, normalized to lowercase, blanks dropped.
    #[test]
    fn search_engine_list() {
        let cfg = config_from(&[("SEARCH_API", " Tavily, ,arxiv ,duckduckgo"), ("DRAW_BASE_URL", "https://img.local/")]).unwrap();
        assert_eq!(cfg.search.engines, vec!["tavily", "arxiv", "duckduckgo"]);
        assert_eq!(cfg.draw_base_url, "https://img.local");
    }
}
