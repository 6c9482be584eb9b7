//! Configuration types and path resolution for bubblechat.
//!
//! Settings are TOML, read from the platform's XDG config path
//! (`~/.config/bubblechat/config.toml` on Linux) and optionally overridden by
//! a `bubblechat.toml` found between the working directory and the git root.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates the global config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project(&std::env::current_dir()?)?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
    use std::time::Duration;

    #[test]
    fn test_default_toml_parses_to_defaults() {
        let config: Config = toml::from_str(&loader::default_toml()).unwrap();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.max_iterations(), 5);
        assert_eq!(config.tool_timeout(), Duration::from_secs(120));
        assert_eq!(config.gemini.api_key.as_deref(), Some("{env:GEMINI_API_KEY}"));
        assert_eq!(config.retry_config(), crate::llm::RetryConfig::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::default();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.base_url(), crate::constants::GEMINI_DEFAULT_BASE_URL);
        assert_eq!(config.retry_config().max_attempts, 3);
    }

    #[test]
    fn test_project_overrides_global() {
        let global: Config = toml::from_str(
            r#"
model = "gemini-1.5-pro"
max_iterations = 8

[retry]
max_attempts = 4
jitter = false
"#,
        )
        .unwrap();
        let project: Config = toml::from_str(
            r#"
max_iterations = 3

[retry]
jitter = true
"#,
        )
        .unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.model(), "gemini-1.5-pro");
        assert_eq!(merged.max_iterations(), 3);
        let retry = merged.retry_config();
        assert_eq!(retry.max_attempts, 4);
        assert!(retry.jitter);
    }

    #[test]
    fn test_iteration_floor() {
        let config = Config {
            max_iterations: Some(0),
            ..Config::default()
        };
        assert_eq!(config.max_iterations(), 1);
    }

    #[test]
    fn test_redacted_masks_api_key() {
        let mut config = Config::default();
        config.gemini.api_key = Some("AIza-secret".into());
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("AIza-secret"));
        assert_eq!(config.gemini.api_key.as_deref(), Some("AIza-secret"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<Config>("max_iteration = 3").is_err());
    }

    #[test]
    fn test_resolve_str() {
        std::env::set_var("BUBBLECHAT_TEST_KEY", "secret");
        assert_eq!(resolve::resolve_str("{env:BUBBLECHAT_TEST_KEY}"), "secret");
        assert_eq!(
            resolve::resolve_str("pre-{env:BUBBLECHAT_TEST_KEY}-post"),
            "pre-secret-post"
        );
        assert_eq!(resolve::resolve_str("{env:BUBBLECHAT_UNSET_VAR_XYZ}"), "");
        assert_eq!(resolve::resolve_str("{env:unterminated"), "{env:unterminated");
    }

    #[test]
    fn test_load_project_walks_up() {
        let root = std::env::temp_dir().join(format!("bubblechat-cfg-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("bubblechat.toml"), "model = \"gemini-pro\"\n").unwrap();

        let found = Config::load_project(&nested).unwrap().unwrap();
        assert_eq!(found.model(), "gemini-pro");

        std::fs::remove_file(root.join("bubblechat.toml")).unwrap();
        assert!(Config::load_project(&nested).unwrap().is_none());
        std::fs::remove_dir_all(&root).unwrap();
    }
}
