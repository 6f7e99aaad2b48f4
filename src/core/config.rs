//! Application paths and runtime configuration.
//!
//! Configuration comes from an optional `mentora.toml` in the data
//! directory (or next to the binary), with environment variables taking
//! precedence. The API key is environment-only and never written to disk
//! or logged.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ConfigError;

/// Filesystem layout for the assistant's persistent state.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
    pub index_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = discover_data_dir();
        let log_dir = data_dir.join("logs");
        let db_path = data_dir.join("history.db");
        let index_dir = data_dir.join("index");

        for dir in [&data_dir, &log_dir, &index_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            log_dir,
            db_path,
            index_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("MENTORA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("Mentora");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("Mentora");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("mentora")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Runtime configuration for providers and the context budget.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the OpenAI-compatible provider.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer key for the provider. Environment-only; not read from TOML.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Chat-completion model id.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Embedding model id.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Number of corpus chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Character budget for the assembled context.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Output-token cap passed to the generator.
    #[serde(default = "default_max_answer_tokens")]
    pub max_answer_tokens: u32,
    /// HTTP timeout for provider calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_max_context_chars() -> usize {
    12_000
}

fn default_max_answer_tokens() -> u32 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_url: default_base_url(),
            api_key: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
            max_answer_tokens: default_max_answer_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the given paths.
    ///
    /// Looks for `mentora.toml` in the data directory, then in the current
    /// directory; missing files fall back to defaults. Environment
    /// variables override whatever was loaded.
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(paths) {
            Some(path) => {
                let raw = fs::read_to_string(&path)?;
                toml::from_str::<AppConfig>(&raw)
                    .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?
            }
            None => AppConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("MENTORA_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(model) = env::var("MENTORA_CHAT_MODEL") {
            self.chat_model = model;
        }
        if let Ok(model) = env::var("MENTORA_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }
        if let Ok(k) = env::var("MENTORA_TOP_K") {
            if let Ok(k) = k.parse() {
                self.top_k = k;
            }
        }
        self.api_key = env::var("MENTORA_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok();
    }
}

fn find_config_file(paths: &AppPaths) -> Option<PathBuf> {
    let candidates = [
        paths.data_dir.join("mentora.toml"),
        Path::new("mentora.toml").to_path_buf(),
    ];
    candidates.into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_provider_expectations() {
        let config = AppConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_answer_tokens, 500);
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn toml_overrides_defaults_and_keeps_the_rest() {
        let config: AppConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8080"
            top_k = 5
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert!(config.api_key.is_none());
    }
}
