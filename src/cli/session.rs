//! Wiring a [`Conversation`] from configuration.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::constants::GEMINI_API_KEY_ENV;
use crate::conversation::Conversation;
use crate::llm::{GeminiChat, RetryChat};
use crate::tools::ToolRegistry;

/// Everything needed to start a conversation, resolved from config once.
pub(crate) struct SessionSetup {
    pub model: String,
    tools: Arc<ToolRegistry>,
    chat: RetryChat<GeminiChat>,
    max_iterations: usize,
}

impl SessionSetup {
    /// Builds the chat backend and tool registry; `model` overrides config.
    pub(crate) fn from_config(config: &Config, model: Option<&str>) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No Gemini API key found. Set {} or `api_key` under [gemini] in {}",
                GEMINI_API_KEY_ENV,
                Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string()),
            )
        })?;
        let model = model.unwrap_or(config.model()).to_string();
        let tools = Arc::new(ToolRegistry::with_builtins(config.tool_timeout())?);

        let gemini = GeminiChat::new(api_key, &model, config.system_prompt())
            .with_base_url(config.base_url())
            .with_function_declarations(&tools.declarations());
        let chat = RetryChat::new(gemini, config.retry_config());

        info!(model = %model, tools = tools.len(), "session configured");
        Ok(Self {
            model,
            tools,
            chat,
            max_iterations: config.max_iterations(),
        })
    }

    pub(crate) fn into_conversation(self) -> Conversation {
        Conversation::new(Box::new(self.chat), self.tools, self.max_iterations)
    }
}
