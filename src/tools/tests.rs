use super::command_tool::{split_command, CommandTool};
use super::*;
use serde_json::{json, Map};

fn request(name: &str, arguments: Value) -> ToolInvocationRequest {
    let arguments: Map<String, Value> = serde_json::from_value(arguments).unwrap();
    ToolInvocationRequest::new(name, arguments)
}

fn registry_with(tool: CommandTool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(tool)).unwrap();
    registry
}

fn echo() -> CommandTool {
    CommandTool::new("echo", "echo", "Print arguments.", Duration::from_secs(5))
}

#[test]
fn test_registry_with_builtins() {
    let registry = ToolRegistry::with_builtins(Duration::from_secs(1)).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
    assert!(ToolRegistry::new().is_empty());
    let decls = registry.declarations();
    assert_eq!(decls[0].name, "gcloud");
    assert_eq!(
        decls[0].description,
        "Execute a gcloud command with current credentials and project."
    );
    assert_eq!(decls[1].name, "kubectl");
    assert_eq!(decls[1].parameters["required"], json!(["command"]));
    assert_eq!(decls[1].parameters["properties"]["command"]["type"], "string");
}

#[test]
fn test_duplicate_registration() {
    let mut registry = registry_with(echo());
    let err = registry.register(Box::new(echo())).unwrap_err();
    assert!(matches!(err, ToolError::Duplicate { ref name } if name == "echo"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_split_command() {
    assert_eq!(split_command("kubectl", "get namespaces"), vec!["get", "namespaces"]);
    assert_eq!(split_command("kubectl", "kubectl  get\tpods "), vec!["get", "pods"]);
    // Only a whole leading word is stripped.
    assert_eq!(split_command("gcloud", "gcloudy list"), vec!["gcloudy", "list"]);
    assert_eq!(split_command("gcloud", "config gcloud"), vec!["config", "gcloud"]);
    assert!(split_command("gcloud", "   ").is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_dispatch_success() {
    let registry = registry_with(echo());
    let output = registry
        .dispatch(&request("echo", json!({"command": "echo hello world"})))
        .await
        .unwrap();
    assert_eq!(output.trim(), "hello world");
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = ToolRegistry::new();
    let err = registry
        .dispatch(&request("helm", json!({"command": "list"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Unknown { ref name } if name == "helm"));
    assert!(err.to_string().contains("helm"));
}

#[tokio::test]
async fn test_invalid_arguments() {
    let registry = registry_with(echo());
    for args in [json!({}), json!({"command": 3}), json!({"cmd": "hi"})] {
        let err = registry.dispatch(&request("echo", args)).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref tool } if tool == "echo"));
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_failure_keeps_output() {
    let registry = registry_with(CommandTool::new(
        "ls",
        "ls",
        "List files.",
        Duration::from_secs(5),
    ));
    let err = registry
        .dispatch(&request("ls", json!({"command": "/nonexistent_dir_xyz"})))
        .await
        .unwrap_err();
    match &err {
        ToolError::Execution { status, .. } => assert!(status.starts_with("exit code")),
        other => panic!("expected execution error, got {other:?}"),
    }
    assert!(err.output().unwrap().contains("nonexistent_dir_xyz"));
}

#[tokio::test]
async fn test_missing_program() {
    let registry = registry_with(CommandTool::new(
        "ghost",
        "definitely-not-a-real-binary-xyz",
        "Nothing.",
        Duration::from_secs(5),
    ));
    let err = registry
        .dispatch(&request("ghost", json!({"command": "run"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Spawn { .. }));
    assert!(err.output().is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout() {
    let registry = registry_with(CommandTool::new(
        "sleep",
        "sleep",
        "Wait.",
        Duration::from_millis(200),
    ));
    let err = registry
        .dispatch(&request("sleep", json!({"command": "10"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Timeout { .. }));
}
