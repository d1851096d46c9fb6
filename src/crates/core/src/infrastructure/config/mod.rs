//! Client configuration
//!
//! Loaded from TOML, then overridden from the environment. The research
//! topic is supplied per session and never lives here.

use crate::util::errors::{ResearchError, ResearchResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/research";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

pub const ENV_ENDPOINT: &str = "SOVEREIGN_ENDPOINT";
pub const ENV_LOG_LEVEL: &str = "SOVEREIGN_LOG_LEVEL";

const CONFIG_DIR_NAME: &str = "sovereign";
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Streaming endpoint; `?topic=` is appended per session
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Max wait for the next SSE event
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Where exported documents are written (current dir when unset)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            idle_timeout_secs: default_idle_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            export_dir: None,
            log_level: None,
        }
    }
}

impl ClientConfig {
    /// Resolve configuration: explicit file, else the per-user file if it
    /// exists, else defaults; environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>) -> ResearchResult<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ResearchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResearchError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| ResearchError::config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config: path={}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ResearchResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ResearchError::config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Environment lookup is injected so tests do not touch process state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            debug!("Endpoint overridden from environment: endpoint={}", endpoint);
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = Some(level.trim().to_string());
        }
    }

    fn validate(&self) -> ResearchResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ResearchError::config("endpoint cannot be empty"));
        }
        if self.idle_timeout_secs == 0 {
            warn!("idle_timeout_secs is 0; every read will time out immediately");
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
endpoint = "http://intel.local:9000/research"
export_dir = "/tmp/exports"
"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://intel.local:9000/research");
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/exports"));
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    }

    #[test]
    fn blank_endpoint_is_rejected() {
        let err = ClientConfig::from_toml_str(r#"endpoint = "  ""#).unwrap_err();
        assert!(matches!(err, ResearchError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ClientConfig::from_toml_str("endpoint = ").unwrap_err();
        assert!(matches!(err, ResearchError::Config(_)));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut config = ClientConfig::default();
        let env: HashMap<&str, &str> = [
            (ENV_ENDPOINT, " http://override:1/research "),
            (ENV_LOG_LEVEL, "debug"),
        ]
        .into_iter()
        .collect();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.endpoint, "http://override:1/research");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "idle_timeout_secs = 5").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.idle_timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ClientConfig::from_file(Path::new("/nonexistent/sovereign.toml")).unwrap_err();
        assert!(matches!(err, ResearchError::Config(_)));
    }
}
