//! Configuration management for tashd.
//!
//! Loads settings from /etc/tash/config.toml or uses defaults. The provider
//! credential is read from the environment, never from the file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tash_common::materializer::RoutingPolicy;
use tash_common::store::DEFAULT_DATA_DIR;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/tash/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/tash/config.toml";

/// Generative-provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model used for eligibility matching
    #[serde(default = "default_model")]
    pub model: String,

    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable holding the API credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Hard timeout for one consult call, in seconds. On timeout the match
    /// degrades to an empty result, same as a parse failure.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    20
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for the HTTP API
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Document store root
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How template items are routed into the two checklist tracks
    #[serde(default)]
    pub routing_policy: RoutingPolicy,
}

fn default_bind_addr() -> String {
    // Localhost only; the desk UI proxies through its own backend.
    "127.0.0.1:7895".to_string()
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
            routing_policy: RoutingPolicy::default(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.5-flash-lite");
        assert_eq!(config.llm.timeout_secs, 20);
        assert_eq!(config.daemon.routing_policy, RoutingPolicy::FixedTwoTrack);
        assert!(config.daemon.bind_addr.starts_with("127.0.0.1"));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[llm]
model = "custom-model"
timeout_secs = 5

[daemon]
routing_policy = "by-assignee"
data_dir = "/tmp/tash-test"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "custom-model");
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.daemon.routing_policy, RoutingPolicy::ByAssignee);
        assert_eq!(config.daemon.data_dir, "/tmp/tash-test");
        // Defaults for missing fields
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.daemon.data_dir, DEFAULT_DATA_DIR);
    }
}
