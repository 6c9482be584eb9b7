//! Interactive chat REPL for bubblechat.
//!
//! Line-mode presentation of a [`Conversation`] using [`rustyline`] for
//! readline support. Entries are printed as the conversation appends them,
//! so tool calls show up while the turn is still running.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::SessionSetup;
use crate::config::Config;
use crate::constants::WELCOME_MESSAGE;
use crate::format;
use crate::transcript::TranscriptEntry;

/// Runs the interactive chat REPL.
///
/// # Readline behavior
///
/// - **Ctrl+C** at the prompt: cancels current input, stays in REPL
/// - **Ctrl+C** during a turn: cancels the turn
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/bubblechat/chat_history.txt`
pub async fn run_chat(setup: SessionSetup) -> Result<()> {
    println!(
        "{} [model: {}] (Ctrl+D to exit, /help for commands)",
        "bubblechat".bold().cyan(),
        setup.model.yellow(),
    );
    println!();

    let mut conversation = setup
        .into_conversation()
        .with_on_entry(|entry| println!("{}\n", format::format_entry(entry)));
    conversation.append_entry(TranscriptEntry::agent(WELCOME_MESSAGE));

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                if line.starts_with('/') {
                    if let commands::CommandAction::Unknown(cmd) =
                        commands::handle_slash_command(&line, &conversation)
                    {
                        println!("{} Unknown command: {}", "?".yellow(), cmd);
                    }
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let cancel = CancellationToken::new();
                let interrupt = {
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            debug!("interrupt received, cancelling turn");
                            cancel.cancel();
                        }
                    })
                };
                conversation.submit_query_with_cancel(&line, &cancel).await;
                interrupt.abort();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}
