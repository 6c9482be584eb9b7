//! Environment variable substitution and typed accessors with defaults.

use std::time::Duration;

use super::types::Config;
use crate::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, GEMINI_API_KEY_ENV,
    GEMINI_DEFAULT_BASE_URL, TOOL_DEFAULT_TIMEOUT_SECS,
};
use crate::llm::RetryConfig;

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        for field in [
            &mut self.model,
            &mut self.system_prompt,
            &mut self.gemini.api_key,
            &mut self.gemini.base_url,
        ] {
            if let Some(value) = field {
                *value = resolve_str(value);
            }
        }
    }

    /// Model identifier, falling back to the built-in default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Chat sends per turn; never below one.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS).max(1)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs.unwrap_or(TOOL_DEFAULT_TIMEOUT_SECS))
    }

    pub fn base_url(&self) -> &str {
        self.gemini
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(GEMINI_DEFAULT_BASE_URL)
    }

    /// Resolve the Gemini API key: env var first, then config value.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(val) = std::env::var(GEMINI_API_KEY_ENV) {
            if !val.is_empty() {
                return Some(val);
            }
        }
        self.gemini.api_key.clone().filter(|k| !k.is_empty())
    }

    /// Copy safe to print, with any API key masked.
    pub fn redacted(&self) -> Config {
        let mut config = self.clone();
        if let Some(key) = config.gemini.api_key.as_mut().filter(|k| !k.is_empty()) {
            *key = "********".to_string();
        }
        config
    }

    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        let retry = &self.retry;
        RetryConfig {
            max_attempts: retry.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            initial_backoff: retry
                .initial_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.initial_backoff),
            max_backoff: retry
                .max_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_backoff),
            backoff_factor: retry
                .backoff_factor
                .filter(|f| *f >= 1.0)
                .unwrap_or(defaults.backoff_factor),
            jitter: retry.jitter.unwrap_or(defaults.jitter),
        }
    }
}

/// Replace {env:VAR} with the environment variable value.
pub(super) fn resolve_str(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("{env:") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 5..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}
