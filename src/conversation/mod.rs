//! The tool-augmented conversation loop.
//!
//! A [`Conversation`] owns one chat session and one [`Transcript`]. Each call
//! to [`Conversation::submit_query`] runs a single turn: the query is sent,
//! reply parts are turned into transcript entries, requested tools are run in
//! the order the model listed them, and their results are fed back until the
//! model answers in plain text or the round-trip bound is spent.
//!
//! Failures never escape a turn. Anything that goes wrong is recorded as an
//! [`EntryKind::Error`](crate::transcript::EntryKind::Error) entry in causal
//! order with the rest of the transcript.

use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm::{
    ChatError, ChatInput, ChatReply, ChatSession, Part, ToolInvocationRequest,
    ToolInvocationResult,
};
use crate::tools::{ToolError, ToolRegistry};
use crate::transcript::{Transcript, TranscriptEntry};

/// Callback invoked after every appended entry.
pub type EntryObserver = Box<dyn Fn(&TranscriptEntry) + Send + Sync>;

/// Why a turn, or one step of it, failed.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("{0}")]
    Backend(#[from] ChatError),

    #[error("No response from the model.")]
    EmptyReply,

    #[error("No response parts from the model.")]
    NoParts,

    #[error("Unknown part type in response: {0}")]
    UnrecognizedPart(String),

    #[error(
        "Stopped after {limit} model round-trips; skipped: {}",
        skipped.join(", ")
    )]
    IterationLimit { limit: usize, skipped: Vec<String> },

    #[error("Turn cancelled.")]
    Cancelled,
}

/// One chat session with its transcript and the tools it may call.
pub struct Conversation {
    transcript: Transcript,
    tools: Arc<ToolRegistry>,
    chat: Box<dyn ChatSession>,
    max_iterations: usize,
    on_entry: Option<EntryObserver>,
}

impl Conversation {
    /// `chat` must already advertise the declarations of `tools`.
    /// `max_iterations` bounds chat sends per turn and is at least one.
    pub fn new(
        chat: Box<dyn ChatSession>,
        tools: Arc<ToolRegistry>,
        max_iterations: usize,
    ) -> Self {
        Self {
            transcript: Transcript::new(),
            tools,
            chat,
            max_iterations: max_iterations.max(1),
            on_entry: None,
        }
    }

    /// Registers a callback that sees each entry as it is appended.
    pub fn with_on_entry(
        mut self,
        observer: impl Fn(&TranscriptEntry) + Send + Sync + 'static,
    ) -> Self {
        self.on_entry = Some(Box::new(observer));
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Appends an entry produced outside a turn (e.g. the welcome message).
    pub fn append_entry(&mut self, entry: TranscriptEntry) {
        if let Some(observer) = &self.on_entry {
            observer(&entry);
        }
        self.transcript.append(entry);
    }

    fn append_error(&mut self, err: impl std::fmt::Display) {
        self.append_entry(TranscriptEntry::error(err.to_string()));
    }

    /// Runs one turn for `query`. Blank queries are ignored.
    pub async fn submit_query(&mut self, query: &str) {
        self.submit_query_with_cancel(query, &CancellationToken::new())
            .await;
    }

    /// Like [`submit_query`](Self::submit_query), stopping early once
    /// `cancel` fires. In-flight sends and tool processes are dropped.
    pub async fn submit_query_with_cancel(&mut self, query: &str, cancel: &CancellationToken) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.append_entry(TranscriptEntry::user(query));

        if let Err(err) = self.run_turn(query, cancel).await {
            warn!("turn ended early: {err}");
            self.append_error(err);
        }
    }

    /// Returns only errors that end the turn; recoverable ones are appended
    /// as they happen.
    async fn run_turn(
        &mut self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<(), TurnError> {
        let mut remaining = self.max_iterations;
        let mut pending = Some(
            self.send(ChatInput::Query(query.to_string()), &mut remaining, cancel)
                .await?,
        );

        while let Some(reply) = pending.take() {
            if cancel.is_cancelled() {
                return Err(TurnError::Cancelled);
            }

            // Only the first candidate is considered.
            let candidate = reply
                .candidates
                .into_iter()
                .next()
                .ok_or(TurnError::EmptyReply)?;
            if candidate.parts.is_empty() {
                return Err(TurnError::NoParts);
            }

            let mut queue: VecDeque<ToolInvocationRequest> = VecDeque::new();
            for part in candidate.parts {
                match part {
                    Part::ToolCalls(calls) => {
                        for call in calls {
                            self.append_entry(TranscriptEntry::tool(call.summary()));
                            queue.push_back(call);
                        }
                    }
                    Part::Text(text) => self.append_entry(TranscriptEntry::agent(text)),
                    Part::Unrecognized(kind) => {
                        self.append_error(TurnError::UnrecognizedPart(kind))
                    }
                }
            }

            while let Some(request) = queue.pop_front() {
                if cancel.is_cancelled() {
                    return Err(TurnError::Cancelled);
                }
                if remaining == 0 {
                    let skipped = std::iter::once(&request)
                        .chain(queue.iter())
                        .map(ToolInvocationRequest::summary)
                        .collect();
                    return Err(TurnError::IterationLimit {
                        limit: self.max_iterations,
                        skipped,
                    });
                }

                let dispatched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TurnError::Cancelled),
                    result = self.tools.dispatch(&request) => result,
                };

                match dispatched {
                    Ok(output) => {
                        let result = ToolInvocationResult::for_request(&request, output);
                        // A later reply supersedes an earlier one from the same batch.
                        pending = Some(
                            self.send(ChatInput::ToolResult(result), &mut remaining, cancel)
                                .await?,
                        );
                    }
                    Err(err) => {
                        warn!(tool = %request.name, "tool failed: {err}");
                        self.append_error(tool_failure(&request, &err));
                    }
                }
            }
        }
        Ok(())
    }

    async fn send(
        &mut self,
        input: ChatInput,
        remaining: &mut usize,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, TurnError> {
        *remaining = remaining.saturating_sub(1);
        debug!(remaining = *remaining, "sending to model");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TurnError::Cancelled),
            reply = self.chat.send(input) => Ok(reply?),
        }
    }
}

/// Entry text for a failed dispatch, including whatever the tool printed.
fn tool_failure(request: &ToolInvocationRequest, err: &ToolError) -> String {
    let mut text = format!("Error executing {}: {err}", request.name);
    if let Some(output) = err.output() {
        text.push('\n');
        text.push_str(output.trim_end());
    }
    text
}
