//! Configuration file management for rewoo.
//!
//! Provides a TOML config file at `~/.config/rewoo/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rewoo_core::capability::{DEFAULT_REASONING_NAME, DEFAULT_SEARCH_NAME};
use rewoo_core::llm::LlmConfig;
use rewoo_core::search::SearchConfig;

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "REWOO_MODEL";
/// Environment variable overriding the chat-completions base URL.
pub const BASE_URL_ENV: &str = "REWOO_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub capabilities: CapabilitiesSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// Names under which the built-in capabilities appear in plans.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CapabilitiesSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the rewoo config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/rewoo` or `~/.config/rewoo`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("rewoo");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("rewoo")
}

/// Return the path to the rewoo config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load the config file if it exists. A file that exists but does not
/// parse is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold API keys.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct RewooConfig {
    pub llm: LlmConfig,
    /// `None` when no search API key is configured.
    pub search: Option<SearchConfig>,
    pub search_name: String,
    pub reasoning_name: String,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl RewooConfig {
    /// Resolve configuration from the config file on disk.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config()?;
        Ok(Self::resolve_with(cli, file.unwrap_or_default()))
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - Model: `--model` > `REWOO_MODEL` > `llm.model` > `gpt-4o-mini`
    /// - Base URL: `--base-url` > `REWOO_BASE_URL` > `llm.base_url` > OpenAI
    /// - LLM key: `OPENAI_API_KEY` > `llm.api_key` > none
    /// - Search key: `TAVILY_API_KEY` > `search.api_key` > none (search disabled)
    pub fn resolve_with(cli: &CliOverrides, file: ConfigFile) -> Self {
        let model = cli
            .model
            .clone()
            .or_else(|| env_var(MODEL_ENV))
            .or(file.llm.model)
            .unwrap_or_else(|| LlmConfig::DEFAULT_MODEL.to_string());

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| env_var(BASE_URL_ENV))
            .or(file.llm.base_url)
            .unwrap_or_else(|| LlmConfig::DEFAULT_BASE_URL.to_string());

        let mut llm = LlmConfig::new(model).with_base_url(base_url);
        llm.api_key = env_var(LlmConfig::API_KEY_ENV).or(file.llm.api_key);
        if let Some(t) = file.llm.temperature {
            llm.temperature = t;
        }
        if let Some(secs) = file.llm.timeout_secs {
            llm.timeout = Duration::from_secs(secs);
        }

        let search = env_var(SearchConfig::API_KEY_ENV)
            .or(file.search.api_key)
            .map(|key| {
                let mut cfg = SearchConfig::new(key);
                if let Some(endpoint) = file.search.endpoint {
                    cfg = cfg.with_endpoint(endpoint);
                }
                if let Some(n) = file.search.max_results {
                    cfg = cfg.with_max_results(n);
                }
                cfg
            });

        Self {
            llm,
            search,
            search_name: file
                .capabilities
                .search
                .unwrap_or_else(|| DEFAULT_SEARCH_NAME.to_string()),
            reasoning_name: file
                .capabilities
                .reasoning
                .unwrap_or_else(|| DEFAULT_REASONING_NAME.to_string()),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
