//! Scripted chat session for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{
    Candidate, ChatError, ChatInput, ChatReply, ChatSession, Part, ToolInvocationRequest,
};

/// Replays a fixed sequence of replies and records every input it receives.
pub(crate) struct ScriptedChat {
    replies: VecDeque<Result<ChatReply, ChatError>>,
    fallback: Option<ChatReply>,
    sent: Arc<Mutex<Vec<ChatInput>>>,
}

impl ScriptedChat {
    pub(crate) fn new(replies: Vec<Result<ChatReply, ChatError>>) -> Self {
        Self {
            replies: replies.into(),
            fallback: None,
            sent: Arc::default(),
        }
    }

    /// Reply returned once the script is exhausted.
    pub(crate) fn with_fallback(mut self, reply: ChatReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Shared handle to the inputs sent so far.
    pub(crate) fn sent(&self) -> Arc<Mutex<Vec<ChatInput>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl ChatSession for ScriptedChat {
    async fn send(&mut self, input: ChatInput) -> Result<ChatReply, ChatError> {
        self.sent.lock().unwrap().push(input);
        match self.replies.pop_front() {
            Some(reply) => reply,
            None => match &self.fallback {
                Some(reply) => Ok(reply.clone()),
                None => panic!("scripted chat ran out of replies"),
            },
        }
    }
}

pub(crate) fn reply(parts: Vec<Part>) -> ChatReply {
    ChatReply {
        candidates: vec![Candidate { parts }],
    }
}

pub(crate) fn text_reply(text: &str) -> ChatReply {
    reply(vec![Part::Text(text.to_string())])
}

pub(crate) fn call(name: &str, command: &str) -> ToolInvocationRequest {
    let mut arguments = Map::new();
    arguments.insert("command".to_string(), Value::String(command.to_string()));
    ToolInvocationRequest::new(name, arguments)
}

pub(crate) fn tool_reply(name: &str, command: &str) -> ChatReply {
    reply(vec![Part::ToolCalls(vec![call(name, command)])])
}

/// The `output` text of a tool-result input, if it is one.
pub(crate) fn result_output(input: &ChatInput) -> Option<String> {
    match input {
        ChatInput::ToolResult(result) => result.output["output"].as_str().map(str::to_string),
        ChatInput::Query(_) => None,
    }
}
