//! Chat capability used by the conversation loop.
//!
//! [`ChatSession`] is the seam between the loop and a language-model backend:
//! one call sends either the user's query or a tool result and returns the
//! model's structured reply. [`GeminiChat`] talks to the Gemini REST API and
//! [`RetryChat`] adds exponential backoff for transient failures.

mod gemini;
mod retry;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use gemini::GeminiChat;
pub use retry::{RetryChat, RetryConfig};
pub use types::{
    Candidate, ChatInput, ChatReply, Part, ToolInvocationRequest, ToolInvocationResult,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a chat backend.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ChatError {
    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_timeout() || err.is_connect(),
            ChatError::Api { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            ChatError::Decode(_) => false,
        }
    }
}

/// A stateful conversation with a model.
///
/// Implementations keep their own history: each `send` continues the same
/// conversation. A failed `send` must leave the history as it was.
#[async_trait]
pub trait ChatSession: Send {
    async fn send(&mut self, input: ChatInput) -> Result<ChatReply, ChatError>;
}

#[async_trait]
impl<C: ChatSession + ?Sized> ChatSession for Box<C> {
    async fn send(&mut self, input: ChatInput) -> Result<ChatReply, ChatError> {
        (**self).send(input).await
    }
}
