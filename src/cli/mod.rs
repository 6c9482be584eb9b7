//! Command-line interface definition and dispatch for bubblechat.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler; building a conversation from config lives in the
//! [`session`] submodule.

mod session;

use crate::{chat, config::Config, format, tools::ToolRegistry, tui};
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

pub(crate) use session::SessionSetup;

/// Top-level CLI structure for bubblechat.
#[derive(Parser)]
#[command(
    name = "bubblechat",
    version,
    about = "Chat with Gemini about your cloud, with gcloud and kubectl at hand"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands for the bubblechat CLI.
///
/// The `///` doc comments on variants double as `--help` text.
#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Open the full-screen terminal UI
        #[arg(long)]
        tui: bool,
    },
    /// Print the tool declarations sent to the model
    Tools,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask { prompt, model } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: bubblechat ask \"your question here\"");
            }

            let config = Config::load()?;
            let setup = SessionSetup::from_config(&config, model.as_deref())?;

            println!(
                "{} [model: {}]",
                "bubblechat".bold().cyan(),
                setup.model.yellow(),
            );
            println!();

            let mut conversation = setup
                .into_conversation()
                .with_on_entry(|entry| println!("{}\n", format::format_entry(entry)));
            conversation.submit_query(&prompt).await;
            Ok(())
        }
        Commands::Chat { model, tui } => {
            let config = Config::load()?;
            let setup = SessionSetup::from_config(&config, model.as_deref())?;
            if tui {
                tui::run_tui(setup).await
            } else {
                chat::run_chat(setup).await
            }
        }
        Commands::Tools => {
            let config = Config::load()?;
            let registry = ToolRegistry::with_builtins(config.tool_timeout())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&registry.declarations())?
            );
            Ok(())
        }
        Commands::Config { action } => {
            let config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    println!("{}", toml::to_string_pretty(&config.redacted())?);
                }
            }
            Ok(())
        }
    }
}
