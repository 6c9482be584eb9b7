//! Command tool: runs an external CLI (`gcloud`, `kubectl`) with the
//! arguments the model supplied.

use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

use super::{command_schema, Tool, ToolError};

/// Tool that executes one external program in a child process.
///
/// The command text is split on whitespace, with no shell involved, so
/// pipes, globs and quoting are not interpreted. The child inherits the
/// current credentials and is killed if the wait is abandoned.
///
/// stdout and stderr are captured on separate pipes and returned as all of
/// stdout followed by all of stderr, not interleaved in write order.
pub struct CommandTool {
    name: String,
    program: String,
    description: String,
    timeout: Duration,
}

impl CommandTool {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        description: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            description: description.into(),
            timeout,
        }
    }

    pub fn gcloud(timeout: Duration) -> Self {
        Self::new(
            "gcloud",
            "gcloud",
            "Execute a gcloud command with current credentials and project.",
            timeout,
        )
    }

    pub fn kubectl(timeout: Duration) -> Self {
        Self::new(
            "kubectl",
            "kubectl",
            "Execute a kubectl command with current credentials and context.",
            timeout,
        )
    }
}

/// Split `command` into arguments, dropping a leading `program` word the
/// model sometimes repeats (`kubectl get pods` -> `["get", "pods"]`).
pub fn split_command<'a>(program: &str, command: &'a str) -> Vec<&'a str> {
    let mut words = command.split_whitespace().peekable();
    if words.peek() == Some(&program) {
        words.next();
    }
    words.collect()
}

#[async_trait::async_trait]
impl Tool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        command_schema(&self.program)
    }

    async fn execute(&self, command: &str) -> Result<String, ToolError> {
        let args = split_command(&self.program, command);
        debug!(program = %self.program, ?args, "spawning");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ToolError::Spawn {
            tool: self.name.clone(),
            source,
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ToolError::Spawn {
                    tool: self.name.clone(),
                    source,
                })
            }
            Err(_) => {
                warn!(tool = %self.name, "timed out after {:?}", self.timeout);
                return Err(ToolError::Timeout {
                    tool: self.name.clone(),
                    after: self.timeout,
                });
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        } else {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "no exit code (terminated by signal)".to_string(),
            };
            Err(ToolError::Execution {
                tool: self.name.clone(),
                status,
                output: text,
            })
        }
    }
}
