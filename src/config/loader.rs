//! File loading and merging for bubblechat configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{Config, GeminiConfig, RetrySettings};
use crate::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL, GEMINI_API_KEY_ENV, PROJECT_CONFIG_FILENAME,
    RETRY_BACKOFF_FACTOR_DEFAULT, RETRY_INITIAL_BACKOFF_SECS_DEFAULT, RETRY_JITTER_DEFAULT,
    RETRY_MAX_ATTEMPTS_DEFAULT, RETRY_MAX_BACKOFF_SECS_DEFAULT, TOOL_DEFAULT_TIMEOUT_SECS,
};

/// Written to the global config path on first run.
pub(super) fn default_toml() -> String {
    format!(
        r#"model = "{DEFAULT_MODEL}"
max_iterations = {DEFAULT_MAX_ITERATIONS}
tool_timeout_secs = {TOOL_DEFAULT_TIMEOUT_SECS}

[gemini]
api_key = "{{env:{GEMINI_API_KEY_ENV}}}"

[retry]
max_attempts = {RETRY_MAX_ATTEMPTS_DEFAULT}
initial_backoff_secs = {RETRY_INITIAL_BACKOFF_SECS_DEFAULT}
max_backoff_secs = {RETRY_MAX_BACKOFF_SECS_DEFAULT}
backoff_factor = {RETRY_BACKOFF_FACTOR_DEFAULT:?}
jitter = {RETRY_JITTER_DEFAULT}
"#
    )
}

impl Config {
    /// Loads the global config from `~/.config/bubblechat/config.toml`,
    /// creating it with defaults if it does not exist.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = default_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            return toml::from_str(&default_toml).context("Failed to parse default config");
        }
        Self::load_file(&path)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Look for `bubblechat.toml` in `start`, then walk up to the git root.
    pub(super) fn load_project(start: &Path) -> Result<Option<Config>> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load_file(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: project.model.or(global.model),
            system_prompt: project.system_prompt.or(global.system_prompt),
            max_iterations: project.max_iterations.or(global.max_iterations),
            tool_timeout_secs: project.tool_timeout_secs.or(global.tool_timeout_secs),
            gemini: GeminiConfig {
                api_key: project.gemini.api_key.or(global.gemini.api_key),
                base_url: project.gemini.base_url.or(global.gemini.base_url),
            },
            retry: RetrySettings {
                max_attempts: project.retry.max_attempts.or(global.retry.max_attempts),
                initial_backoff_secs: project
                    .retry
                    .initial_backoff_secs
                    .or(global.retry.initial_backoff_secs),
                max_backoff_secs: project
                    .retry
                    .max_backoff_secs
                    .or(global.retry.max_backoff_secs),
                backoff_factor: project.retry.backoff_factor.or(global.retry.backoff_factor),
                jitter: project.retry.jitter.or(global.retry.jitter),
            },
        }
    }
}
