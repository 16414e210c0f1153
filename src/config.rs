//! Configuration management for perplx.
//!
//! Configuration is loaded from `~/.config/perplx/config.toml`.

use crate::llm::gemini;
use crate::spinner::SpinnerStyle;
use crate::theme::ThemeKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// How answers are drawn.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Backend configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Google Gemini API.
    Gemini {
        /// Model name (default: gemini-2.0-flash-lite).
        #[serde(default = "default_gemini_model")]
        model: String,
        /// API key (prefer GOOGLE_API_KEY env var).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
    },
    /// Ollama local backend.
    Ollama {
        /// Model name (default: llama3.2).
        #[serde(default = "default_ollama_model")]
        model: String,
        /// Ollama host URL (default: http://localhost:11434).
        #[serde(default = "default_ollama_host")]
        host: String,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Gemini {
            model: default_gemini_model(),
            api_key: None,
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_gemini_base_url() -> String {
    gemini::DEFAULT_BASE_URL.to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub theme: ThemeKind,
    #[serde(default)]
    pub spinner: SpinnerStyle,
    /// Waiting indicator frame interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: ThemeKind::default(),
            spinner: SpinnerStyle::default(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_tick_ms() -> u64 {
    100
}

impl DisplayConfig {
    /// Tick interval, never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("perplx"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path.
    pub fn log_path() -> Result<PathBuf> {
        dirs::cache_dir()
            .or_else(dirs::home_dir)
            .map(|p| p.join("perplx").join("perplx.log"))
            .context("Could not determine cache directory")
    }

    /// Load configuration from file, using defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get the backend type as a string.
    pub fn backend_type(&self) -> &'static str {
        match &self.backend {
            BackendConfig::Gemini { .. } => "gemini",
            BackendConfig::Ollama { .. } => "ollama",
        }
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        match &self.backend {
            BackendConfig::Gemini { model, .. } | BackendConfig::Ollama { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(matches!(config.backend, BackendConfig::Gemini { .. }));
        assert_eq!(config.model_name(), "gemini-2.0-flash-lite");
        assert_eq!(config.display.theme, ThemeKind::Dark);
        assert_eq!(config.display.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("gemini"));
        assert!(!toml.contains("api_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
[backend]
type = "ollama"
model = "qwen2.5:7b"

[display]
theme = "light"
spinner = "bear"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend_type(), "ollama");
        assert_eq!(config.model_name(), "qwen2.5:7b");
        assert_eq!(config.display.theme, ThemeKind::Light);
        assert_eq!(config.display.spinner, SpinnerStyle::Bear);
        assert_eq!(config.display.tick_ms, 100);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let display = DisplayConfig {
            tick_ms: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(display.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.backend_type(), "gemini");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.display.spinner = SpinnerStyle::Bear;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.display.spinner, SpinnerStyle::Bear);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
