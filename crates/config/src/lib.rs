//! Configuration loading, validation, and management for newsdesk.
//!
//! Loads configuration from `~/.newsdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup: a configuration
//! that cannot support its selected features (e.g. the LLM classifier
//! without an API key, or search enabled without an index URL) is rejected
//! before any session is opened, never per turn.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.newsdesk/config.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Generation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Search index configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Per-call deadlines for external services
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("embedding", &self.embedding)
            .field("search", &self.search)
            .field("chat", &self.chat)
            .field("gateway", &self.gateway)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (or `NEWSDESK_API_KEY` / `OPENAI_API_KEY` in the environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            model: default_embedding_model(),
        }
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Whether retrieval is available at all. With search disabled every
    /// question is answered from general knowledge.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_search_url")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_index")]
    pub index: String,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_true() -> bool {
    true
}
fn default_search_url() -> String {
    "https://localhost:9200".into()
}
fn default_index() -> String {
    "ai_news_01".into()
}
fn default_top_k() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_search_url(),
            username: None,
            password: None,
            index: default_index(),
            top_k: default_top_k(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("index", &self.index)
            .field("top_k", &self.top_k)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Default persona for new sessions ("technical" or "non-technical")
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Which retrieval-need classifier to use: "keyword" or "llm"
    #[serde(default = "default_classifier")]
    pub classifier: String,

    /// Sliding-window size in user+assistant pairs; 0 = unbounded history
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,

    /// Reformulate retrieval queries from windowed history plus the
    /// question instead of the raw question
    #[serde(default)]
    pub reformulate_queries: bool,

    /// Per-document cap on evidence text folded into a prompt, in chars
    #[serde(default = "default_max_evidence_chars")]
    pub max_evidence_chars: usize,

    /// Cap on the whole evidence block, in chars
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_persona() -> String {
    "technical".into()
}
fn default_classifier() -> String {
    "keyword".into()
}
fn default_window_turns() -> usize {
    10
}
fn default_max_evidence_chars() -> usize {
    1000
}
fn default_max_context_chars() -> usize {
    6000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            classifier: default_classifier(),
            window_turns: default_window_turns(),
            reformulate_queries: false,
            max_evidence_chars: default_max_evidence_chars(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8704
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_generation_secs")]
    pub generation_secs: u64,

    #[serde(default = "default_retrieval_secs")]
    pub retrieval_secs: u64,

    #[serde(default = "default_embedding_secs")]
    pub embedding_secs: u64,
}

fn default_generation_secs() -> u64 {
    60
}
fn default_retrieval_secs() -> u64 {
    10
}
fn default_embedding_secs() -> u64 {
    10
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            generation_secs: default_generation_secs(),
            retrieval_secs: default_retrieval_secs(),
            embedding_secs: default_embedding_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.newsdesk/config.toml).
    ///
    /// Also checks environment variables:
    /// - `NEWSDESK_API_KEY` then `OPENAI_API_KEY` for the provider key
    /// - `NEWSDESK_MODEL` for the generation model
    /// - `NEWSDESK_ES_URL`, `NEWSDESK_ES_USER`, `NEWSDESK_ES_PASSWORD` for
    ///   the search cluster
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var("NEWSDESK_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("NEWSDESK_MODEL") {
            config.provider.model = model;
        }

        if let Ok(url) = std::env::var("NEWSDESK_ES_URL") {
            config.search.url = url;
        }
        if let Ok(user) = std::env::var("NEWSDESK_ES_USER") {
            config.search.username = Some(user);
        }
        if let Ok(password) = std::env::var("NEWSDESK_ES_PASSWORD") {
            config.search.password = Some(password);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".newsdesk")
    }

    /// Validate the configuration. Violations are fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        match self.chat.classifier.as_str() {
            "keyword" | "llm" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "chat.classifier must be \"keyword\" or \"llm\", got {other:?}"
                )));
            }
        }

        match self.chat.persona.parse::<PersonaName>() {
            Ok(_) => {}
            Err(e) => return Err(ConfigError::ValidationError(e)),
        }

        if self.search.enabled {
            if self.search.url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "search.enabled requires search.url".into(),
                ));
            }
            if self.search.index.is_empty() {
                return Err(ConfigError::ValidationError(
                    "search.enabled requires search.index".into(),
                ));
            }
            if self.search.top_k == 0 {
                return Err(ConfigError::ValidationError(
                    "search.top_k must be at least 1".into(),
                ));
            }
            if self.embedding.base_url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "search.enabled requires embedding.base_url".into(),
                ));
            }
        }

        if self.timeouts.generation_secs == 0
            || self.timeouts.retrieval_secs == 0
            || self.timeouts.embedding_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least 1 second".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Minimal persona name check kept here so config validation does not pull
/// in the whole core crate.
struct PersonaName;

impl std::str::FromStr for PersonaName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" | "non-technical" | "non_technical" | "nontechnical" => Ok(PersonaName),
            other => Err(format!("chat.persona: unknown persona {other:?}")),
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

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
