//! Provider-agnostic request and reply types exchanged with a chat session.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::COMMAND_ARGUMENT;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Correlation id; some backends omit it, in which case correlation is
    /// positional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the tool to invoke.
    pub name: String,
    /// Loosely-typed arguments keyed by parameter name.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocationRequest {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    #[cfg(test)]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The `command` argument, when present and a string.
    pub fn command(&self) -> Option<&str> {
        self.arguments.get(COMMAND_ARGUMENT).and_then(Value::as_str)
    }

    /// Short human-readable summary, e.g. `kubectl: get pods`.
    pub fn summary(&self) -> String {
        match self.arguments.get(COMMAND_ARGUMENT) {
            Some(Value::String(command)) => format!("{}: {}", self.name, command),
            Some(other) => format!("{}: {}", self.name, other),
            None => format!("{}: <no command>", self.name),
        }
    }
}

/// The outcome of a tool call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Always an object with at least an `output` text field.
    pub output: Value,
}

impl ToolInvocationResult {
    /// Builds the result for `request` carrying the tool's output text.
    pub fn for_request(request: &ToolInvocationRequest, output: impl Into<String>) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            output: json!({ "output": output.into() }),
        }
    }
}

/// Content sent to a chat session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    /// A plain user query.
    Query(String),
    /// The result of a tool call the model requested.
    ToolResult(ToolInvocationResult),
}

/// A complete reply from the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub candidates: Vec<Candidate>,
}

/// One alternative reply proposed by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub parts: Vec<Part>,
}

/// One content fragment of a candidate, resolved once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    ToolCalls(Vec<ToolInvocationRequest>),
    /// A part the loop cannot act on; carries a short description of its kind.
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kubectl(command: Value) -> ToolInvocationRequest {
        let mut arguments = Map::new();
        arguments.insert("command".into(), command);
        ToolInvocationRequest::new("kubectl", arguments)
    }

    #[test]
    fn test_command_extraction() {
        assert_eq!(kubectl(json!("get pods")).command(), Some("get pods"));
        assert_eq!(kubectl(json!(42)).command(), None);
        assert_eq!(ToolInvocationRequest::new("kubectl", Map::new()).command(), None);
    }

    #[test]
    fn test_summary() {
        assert_eq!(kubectl(json!("get namespaces")).summary(), "kubectl: get namespaces");
        assert_eq!(kubectl(json!(["get"])).summary(), "kubectl: [\"get\"]");
    }

    #[test]
    fn test_result_echoes_request() {
        let request = kubectl(json!("version")).with_id("call-7");
        let result = ToolInvocationResult::for_request(&request, "v1.2.3");
        assert_eq!(result.id.as_deref(), Some("call-7"));
        assert_eq!(result.name, "kubectl");
        assert_eq!(result.output, json!({"output": "v1.2.3"}));
    }
}
