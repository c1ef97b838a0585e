//! Configuration for xagent.
//!
//! Two layers:
//! - [`load_and_apply`] fills the process environment from the project `.env` and the XDG
//!   `config.toml` `[env]` table, with priority **existing env > .env > XDG**.
//! - [`AppConfig`] reads that environment once into an explicit, immutable value that is
//!   passed to model, tool and publisher constructors.

mod app;
mod dotenv;
mod xdg_toml;

pub use app::{
    AgentLlmMap, AgentRole, AppConfig, ConfigError, LlmRoles, LlmType, ModelConfig,
    ResearchSettings, SearchSettings, Timeouts,
};

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Sets every key found in `.env` or the XDG `[env]` table that is **not** already present
/// in the process environment.
///
/// * `app_name`: directory under the XDG config home, e.g. `"xagent"`.
/// * `override_dir`: where to look for `.env`; defaults to the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let from_xdg = xdg_toml::load_env_map(app_name)?;
    let from_dotenv = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: HashSet<&String> = from_xdg.keys().chain(from_dotenv.keys()).collect();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(value) = from_dotenv.get(key).or_else(|| from_xdg.get(key)) {
            std::env::set_var(key, value);
        }
    }
    Ok(())
}

/// Serializes tests that mutate process-wide env vars.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn capture(keys: &[&'static str]) -> Self {
            Self(keys.iter().map(|k| (*k, env::var(k).ok())).collect())
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in &self.0 {
                match v {
                    Some(v) => env::set_var(k, v),
                    None => env::remove_var(k),
                }
            }
        }
    }

    fn xdg_with(app: &str, body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(app)).unwrap();
        std::fs::write(dir.path().join(app).join("config.toml"), body).unwrap();
        dir
    }

    /// **Scenario**: A variable already in the environment is never overwritten.
    #[test]
    fn process_env_has_priority() {
        let _lock = env_lock();
        let _g = EnvGuard::capture(&["XA_LOAD_EXISTING"]);
        let dotenv_dir = tempfile::tempdir().unwrap();
        std::fs::write(dotenv_dir.path().join(".env"), "XA_LOAD_EXISTING=from_dotenv\n").unwrap();
        env::set_var("XA_LOAD_EXISTING", "from_env");
        load_and_apply("xagent-load-none-71c2", Some(dotenv_dir.path())).unwrap();
        assert_eq!(env::var("XA_LOAD_EXISTING").as_deref(), Ok("from_env"));
    }

    /// **Scenario**: With both sources present, `.env` beats the XDG table; XDG-only keys still apply.
    #[test]
    fn dotenv_beats_xdg_and_xdg_fills_gaps() {
        let _lock = env_lock();
        let _g = EnvGuard::capture(&["XDG_CONFIG_HOME", "XA_LOAD_BOTH", "XA_LOAD_XDG_ONLY"]);
        let xdg = xdg_with(
            "xa-load",
            "[env]\nXA_LOAD_BOTH = \"from_xdg\"\nXA_LOAD_XDG_ONLY = \"xdg\"\n",
        );
        let dotenv_dir = tempfile::tempdir().unwrap();
        std::fs::write(dotenv_dir.path().join(".env"), "XA_LOAD_BOTH=from_dotenv\n").unwrap();

        env::set_var("XDG_CONFIG_HOME", xdg.path());
        env::remove_var("XA_LOAD_BOTH");
        env::remove_var("XA_LOAD_XDG_ONLY");
        load_and_apply("xa-load", Some(dotenv_dir.path())).unwrap();

        assert_eq!(env::var("XA_LOAD_BOTH").as_deref(), Ok("from_dotenv"));
        assert_eq!(env::var("XA_LOAD_XDG_ONLY").as_deref(), Ok("xdg"));
        env::remove_var("XA_LOAD_BOTH");
        env::remove_var("XA_LOAD_XDG_ONLY");
    }

    /// **Scenario**: Nothing to load is not an error.
    #[test]
    fn no_sources_is_ok() {
        let _lock = env_lock();
        let empty = tempfile::tempdir().unwrap();
        assert!(load_and_apply("xagent-load-none-71c2", Some(empty.path())).is_ok());
    }

    /// **Scenario**: Invalid XDG TOML surfaces as XdgParse.
    #[test]
    fn invalid_xdg_is_reported() {
        let _lock = env_lock();
        let _g = EnvGuard::capture(&["XDG_CONFIG_HOME"]);
        let xdg = xdg_with("xa-load-bad", "env = [\n");
        env::set_var("XDG_CONFIG_HOME", xdg.path());
        let empty = tempfile::tempdir().unwrap();
        let result = load_and_apply("xa-load-bad", Some(empty.path()));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
