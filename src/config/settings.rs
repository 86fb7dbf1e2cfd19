//! Configuration settings for Veritas.

use crate::error::{Result, VeritasError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling on documents handed back to the model per tool call.
pub const MAX_SEARCH_RESULTS: usize = 3;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Reasoning model settings.
///
/// Any OpenAI-compatible chat completions endpoint works. The default points
/// at Gemini's compatibility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model name sent with every request.
    pub model: String,
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Inline API key (takes precedence over `api_key_env`).
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: None,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search provider (tavily).
    pub provider: String,
    /// Base URL of the search API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Inline API key (takes precedence over `api_key_env`).
    pub api_key: Option<String>,
    /// Results requested per tool call, clamped to 1..=3.
    pub max_results: usize,
    /// Tavily search depth (basic, advanced).
    pub search_depth: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            api_base: "https://api.tavily.com".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            api_key: None,
            max_results: MAX_SEARCH_RESULTS,
            search_depth: "basic".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SearchSettings {
    /// Configured result count, kept within the per-call cap.
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_SEARCH_RESULTS)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VeritasError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("veritas")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

/// Resolve an API key from an inline value or an environment variable.
///
/// Blank values count as missing.
pub fn resolve_key(inline: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = inline.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(VeritasError::Config(format!("{} is empty", env_var))),
        Err(_) => Err(VeritasError::Config(format!("{} not set", env_var))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.model, "gemini-2.5-flash");
        assert_eq!(settings.search.max_results, 3);
        assert_eq!(settings.server.port, 3001);
    }

    #[test]
    fn test_max_results_clamped() {
        let mut search = SearchSettings::default();
        search.max_results = 10;
        assert_eq!(search.effective_max_results(), 3);
        search.max_results = 0;
        assert_eq!(search.effective_max_results(), 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.search.provider, "tavily");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.model.model = "gpt-4o-mini".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/veritas/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.general.log_level, "warn");
    }

    #[test]
    fn test_resolve_key_prefers_inline() {
        let key = resolve_key(Some("inline-key"), "VERITAS_TEST_UNSET_KEY").unwrap();
        assert_eq!(key, "inline-key");
        assert!(resolve_key(Some("  "), "VERITAS_TEST_UNSET_KEY").is_err());
    }
}
