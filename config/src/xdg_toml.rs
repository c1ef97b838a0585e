//! `[env]` table from `$XDG_CONFIG_HOME/<app>/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// `XDG_CONFIG_HOME` when set, else the platform config dir.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

fn config_file(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let path = config_home()?.join(app_name).join("config.toml");
    Ok(path.is_file().then_some(path))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Key-value pairs of the `[env]` table. No file, or no table, yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = config_file(app_name)? else {
        return Ok(HashMap::new());
    };
    let raw = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let parsed: ConfigFile = toml::from_str(&raw)?;
    Ok(parsed.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn with_xdg_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let _lock = crate::env_lock();
        let prev = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", dir);
        let out = f();
        match prev {
            Some(p) => env::set_var("XDG_CONFIG_HOME", p),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        out
    }

    fn write_app_config(root: &std::path::Path, app: &str, body: &str) {
        let app_dir = root.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    /// **Scenario**: An app without a config file yields an empty map.
    #[test]
    fn absent_file_is_empty() {
        let map = load_env_map("xagent-config-absent-0f3a").unwrap();
        assert!(map.is_empty());
    }

    /// **Scenario**: String values under `[env]` are returned; other tables are ignored.
    #[test]
    fn reads_env_table_only() {
        let dir = tempfile::tempdir().unwrap();
        write_app_config(
            dir.path(),
            "xa-env",
            "[env]\nBASIC_MODEL = \"deepseek-chat\"\nSEARCH_API = \"tavily,arxiv\"\n\n[other]\nkey = \"x\"\n",
        );
        let map = with_xdg_home(dir.path(), || load_env_map("xa-env")).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("BASIC_MODEL").map(String::as_str), Some("deepseek-chat"));
        assert_eq!(map.get("SEARCH_API").map(String::as_str), Some("tavily,arxiv"));
    }

    /// **Scenario**: Broken TOML is reported as XdgParse, not swallowed.
    #[test]
    fn broken_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_app_config(dir.path(), "xa-broken", "[env\nA = 1\n");
        let result = with_xdg_home(dir.path(), || load_env_map("xa-broken"));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
