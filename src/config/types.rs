//! Struct definitions for bubblechat configuration.

use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `config.toml` / `bubblechat.toml`.
///
/// Every field is optional so a project file only needs to name what it
/// overrides; accessors in `resolve.rs` fill in defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Gemini model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: Option<String>,
    /// Replaces the embedded system prompt.
    pub system_prompt: Option<String>,
    /// Chat sends allowed per user turn.
    pub max_iterations: Option<usize>,
    /// Wall-clock limit for a single `gcloud`/`kubectl` run.
    pub tool_timeout_secs: Option<u64>,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Connection details for the Gemini API.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `GEMINI_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Custom base URL (proxies, regional endpoints).
    pub base_url: Option<String>,
}

/// Backoff policy for transient chat failures.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: Option<u32>,
    pub initial_backoff_secs: Option<u64>,
    pub max_backoff_secs: Option<u64>,
    pub backoff_factor: Option<f64>,
    pub jitter: Option<bool>,
}
