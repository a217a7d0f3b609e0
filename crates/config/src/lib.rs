//! Configuration loading and validation for memento.
//!
//! Loads configuration from `~/.memento/config.toml` with environment
//! variable overrides for secrets and the store URL.

use memento_core::error::Error;
use memento_core::store::ExtractionStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.memento/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API key (env: MEMENTO_API_KEY / OPENROUTER_API_KEY / OPENAI_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// LLM provider name ("openrouter", "openai", "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Memory store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Memory resource configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Which memory store backend to use, and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory", "sqlite", or "http"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database path for the sqlite backend
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// Base URL for the http backend (env: MEMENTO_STORE_URL)
    #[serde(default)]
    pub http_url: Option<String>,

    /// API key for the http backend (env: MEMENTO_STORE_API_KEY)
    #[serde(default)]
    pub http_api_key: Option<String>,
}

fn default_backend() -> String {
    "sqlite".into()
}
fn default_sqlite_path() -> String {
    "~/.memento/memory.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            sqlite_path: default_sqlite_path(),
            http_url: None,
            http_api_key: None,
        }
    }
}

/// Memory resource and recall settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Name of the memory resource to ensure at setup
    #[serde(default = "default_resource_name")]
    pub resource_name: String,

    /// Extraction strategies requested at resource creation
    #[serde(default = "default_strategies")]
    pub strategies: Vec<ExtractionStrategy>,

    /// Raw-event retention window
    #[serde(default = "default_retention_days")]
    pub event_retention_days: u32,

    /// Records to recall per turn
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Seconds to wait before asserting persistence in demos; the store
    /// consolidates out-of-band and a save is not instantly retrievable
    #[serde(default = "default_consolidation_wait_secs")]
    pub consolidation_wait_secs: u64,
}

fn default_resource_name() -> String {
    "memento-assistant".into()
}
fn default_strategies() -> Vec<ExtractionStrategy> {
    vec![
        ExtractionStrategy::Semantic,
        ExtractionStrategy::UserPreference,
    ]
}
fn default_retention_days() -> u32 {
    90
}
fn default_top_k() -> usize {
    5
}
fn default_consolidation_wait_secs() -> u64 {
    30
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            resource_name: default_resource_name(),
            strategies: default_strategies(),
            event_retention_days: default_retention_days(),
            top_k: default_top_k(),
            consolidation_wait_secs: default_consolidation_wait_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            store: StoreConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// The config directory: `~/.memento` (or `$MEMENTO_HOME`).
    pub fn config_dir() -> PathBuf {
        std::env::var("MEMENTO_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".memento"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist. Environment variables override file values.
    pub fn load() -> Result<Self, Error> {
        let path = Self::config_dir().join("config.toml");
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    fn validate(&self) -> Result<(), Error> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config {
                message: "temperature must be between 0.0 and 2.0".into(),
            });
        }
        match self.store.backend.as_str() {
            "memory" | "sqlite" | "http" => {}
            other => {
                return Err(Error::Config {
                    message: format!(
                        "unknown store backend '{other}' (expected memory, sqlite, or http)"
                    ),
                });
            }
        }
        if self.store.backend == "http" && self.store.http_url.is_none() {
            return Err(Error::Config {
                message: "store.http_url (or MEMENTO_STORE_URL) is required for the http backend"
                    .into(),
            });
        }
        Ok(())
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&Self::config_dir().join("config.toml"))
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            message: format!("Failed to serialize config: {e}"),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Config {
                message: format!("Failed to create {}: {e}", parent.display()),
            })?;
        }
        std::fs::write(path, content).map_err(|e| Error::Config {
            message: format!("Failed to write {}: {e}", path.display()),
        })
    }

    fn apply_env_overrides(&mut self) {
        for var in ["MEMENTO_API_KEY", "OPENROUTER_API_KEY", "OPENAI_API_KEY"] {
            if self.api_key.is_none() {
                if let Ok(key) = std::env::var(var) {
                    if !key.is_empty() {
                        self.api_key = Some(key);
                    }
                }
            }
        }
        if let Ok(url) = std::env::var("MEMENTO_STORE_URL") {
            if !url.is_empty() {
                self.store.http_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("MEMENTO_STORE_API_KEY") {
            if !key.is_empty() {
                self.store.http_api_key = Some(key);
            }
        }
    }

    /// Expand a leading `~` in the sqlite path.
    pub fn sqlite_path(&self) -> PathBuf {
        if let Some(rest) = self.store.sqlite_path.strip_prefix("~/") {
            dirs_home().join(rest)
        } else {
            PathBuf::from(&self.store.sqlite_path)
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.memory.top_k, 5);
        assert_eq!(config.memory.strategies.len(), 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let toml_str = r#"
            model = "gpt-4o"

            [memory]
            resource_name = "support-bot"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.memory.resource_name, "support-bot");
        assert_eq!(config.memory.event_retention_days, 90);
        assert_eq!(config.provider, "openrouter");
    }

    #[test]
    fn validate_rejects_unknown_backend() {
        let mut config = AppConfig::default();
        config.store.backend = "redis".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_url_for_http_backend() {
        let mut config = AppConfig::default();
        config.store.backend = "http".into();
        assert!(config.validate().is_err());
        config.store.http_url = Some("http://localhost:8080".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.model = "test-model".into();
        config.memory.top_k = 3;
        config.save_to(&path).unwrap();

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.model, "test-model");
        assert_eq!(reloaded.memory.top_k, 3);
    }
}
