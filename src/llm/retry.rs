//! Exponential-backoff retries around a chat session.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use tracing::warn;

use super::{ChatError, ChatInput, ChatReply, ChatSession};
use crate::constants::{
    RETRY_BACKOFF_FACTOR_DEFAULT, RETRY_INITIAL_BACKOFF_SECS_DEFAULT, RETRY_JITTER_DEFAULT,
    RETRY_MAX_ATTEMPTS_DEFAULT, RETRY_MAX_BACKOFF_SECS_DEFAULT, RETRY_RANDOMIZATION_FACTOR,
};

/// Retry policy for transient chat failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS_DEFAULT,
            initial_backoff: Duration::from_secs(RETRY_INITIAL_BACKOFF_SECS_DEFAULT),
            max_backoff: Duration::from_secs(RETRY_MAX_BACKOFF_SECS_DEFAULT),
            backoff_factor: RETRY_BACKOFF_FACTOR_DEFAULT,
            jitter: RETRY_JITTER_DEFAULT,
        }
    }
}

impl RetryConfig {
    fn backoff(&self) -> backoff::ExponentialBackoff {
        let randomization = if self.jitter {
            RETRY_RANDOMIZATION_FACTOR
        } else {
            0.0
        };
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_randomization_factor(randomization)
            .with_multiplier(self.backoff_factor)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Wraps a session and resends on retryable errors.
///
/// Relies on the inner session leaving its history unchanged when a send
/// fails, so the same input can be sent again.
pub struct RetryChat<C> {
    inner: C,
    config: RetryConfig,
}

impl<C> RetryChat<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<C: ChatSession> ChatSession for RetryChat<C> {
    async fn send(&mut self, input: ChatInput) -> Result<ChatReply, ChatError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = self.config.backoff();
        let mut attempt = 1;

        loop {
            match self.inner.send(input.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = backoff
                        .next_backoff()
                        .unwrap_or(self.config.max_backoff);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "chat send failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
