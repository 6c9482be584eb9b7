pub mod command_tool;

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use command_tool::CommandTool;

use crate::llm::ToolInvocationRequest;

/// Failure of a single tool dispatch.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    Unknown { name: String },

    #[error("invalid arguments for {tool}: expected a string `command`")]
    InvalidArguments { tool: String },

    #[error("tool already registered: {name}")]
    Duplicate { name: String },

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}")]
    Execution {
        tool: String,
        status: String,
        output: String,
    },

    #[error("{tool} timed out after {}s", after.as_secs())]
    Timeout { tool: String, after: Duration },
}

impl ToolError {
    /// Text the tool produced before failing, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            ToolError::Execution { output, .. } if !output.trim().is_empty() => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

/// Definition sent to the model so it knows what tools are available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

impl ToolDeclaration {
    /// Declaration for a tool taking one required string `command`.
    #[cfg(test)]
    pub fn command_tool(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: command_schema(name),
        }
    }
}

/// Schema for the single `command` parameter shared by command tools.
pub fn command_schema(program: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "command": {
                "type": "string",
                "description": format!("The {program} command to run, without the leading `{program}`")
            }
        },
        "required": ["command"]
    })
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description sent to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Run the tool with the extracted `command` argument.
    async fn execute(&self, command: &str) -> Result<String, ToolError>;
}

/// Holds all registered tools and dispatches calls by name.
///
/// Read-only once the session starts; declarations are derived from the
/// registered tools, so the two sets cannot drift apart.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::Duplicate {
                name: tool.name().to_string(),
            });
        }
        self.tools.push(Arc::from(tool));
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Produce declarations for the model (sent at session setup).
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .iter()
            .map(|t| ToolDeclaration {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up the requested tool, extract its `command` and execute it.
    pub async fn dispatch(&self, request: &ToolInvocationRequest) -> Result<String, ToolError> {
        let tool = self.get(&request.name).ok_or_else(|| ToolError::Unknown {
            name: request.name.clone(),
        })?;
        let command = request
            .command()
            .ok_or_else(|| ToolError::InvalidArguments {
                tool: request.name.clone(),
            })?;
        debug!(tool = %request.name, command, "dispatching tool");
        tool.execute(command).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistry {
    /// Create a registry with the `gcloud` and `kubectl` tools.
    pub fn with_builtins(timeout: Duration) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(Box::new(CommandTool::gcloud(timeout)))?;
        registry.register(Box::new(CommandTool::kubectl(timeout)))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests;
