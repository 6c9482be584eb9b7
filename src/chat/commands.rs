//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/tools` and `/help`. Returns a [`CommandAction`]
//! so the REPL loop can decide how to proceed.

use colored::Colorize;

use crate::conversation::Conversation;
use crate::format;

/// Action returned by slash command handling.
#[derive(Debug, PartialEq)]
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

pub(crate) fn handle_slash_command(command: &str, conversation: &Conversation) -> CommandAction {
    match command {
        "/history" => {
            for entry in conversation.transcript() {
                println!("{}\n", format::format_entry(entry));
            }
            CommandAction::Continue
        }
        "/tools" => {
            if conversation.tools().is_empty() {
                println!("  No tools registered.");
            }
            for decl in conversation.tools().declarations() {
                println!("  {} - {}", decl.name.cyan(), decl.description);
            }
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show the conversation so far", "/history".cyan());
            println!("  {} - list the tools the model can run", "/tools".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - cancel a running turn", "Ctrl+C".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedChat;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;
    use std::time::Duration;

    fn conversation() -> Conversation {
        Conversation::new(
            Box::new(ScriptedChat::new(vec![])),
            Arc::new(ToolRegistry::with_builtins(Duration::from_secs(1)).unwrap()),
            5,
        )
    }

    #[test]
    fn test_known_commands() {
        let conversation = conversation();
        for cmd in ["/history", "/tools", "/help"] {
            assert_eq!(
                handle_slash_command(cmd, &conversation),
                CommandAction::Continue
            );
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            handle_slash_command("/compact", &conversation()),
            CommandAction::Unknown("/compact".into())
        );
    }
}
