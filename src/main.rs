//! Entry point for bubblechat, a terminal chat assistant that can run
//! `gcloud` and `kubectl` on the model's behalf.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! sets up file logging and dispatches to the chosen subcommand.

mod chat;
mod cli;
mod config;
mod constants;
mod conversation;
mod format;
mod llm;
mod tools;
mod transcript;
mod tui;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to `~/.cache/bubblechat/bubblechat.log`.
///
/// The level follows `-v` unless `RUST_LOG` is set. Logging is skipped when
/// the cache directory cannot be created; the returned guard flushes on drop.
fn init_logging(verbose: u8) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let dir = config::Config::cache_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, constants::LOG_FILENAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();
    Some(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    let _log_guard = init_logging(cli.verbose);
    tracing::info!("starting {}", constants::APP_NAME);
    cli::run(cli).await
}
