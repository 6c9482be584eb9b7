//! Terminal UI module for bubblechat.
//!
//! Provides the full-screen interface launched via `bubblechat chat --tui`.
//! The conversation runs on a worker task; entries flow back over a channel
//! so the transcript is only ever mutated by the worker while the UI keeps
//! its own copy. The event loop runs with [`tokio::select!`] over a render
//! tick, crossterm's async [`EventStream`] and that channel.

mod app;
mod ui;

pub use app::App;
pub use ui::draw;

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::SessionSetup;
use crate::constants::WELCOME_MESSAGE;
use crate::conversation::Conversation;
use crate::transcript::TranscriptEntry;

/// Render tick interval (~60 fps).
const TICK_DURATION: Duration = Duration::from_millis(16);

/// Messages from the conversation worker to the UI.
#[derive(Debug)]
pub enum UiEvent {
    Entry(TranscriptEntry),
    TurnFinished,
}

/// A query for the worker, with the handle that cancels it.
struct TurnRequest {
    query: String,
    cancel: CancellationToken,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Launches the TUI.
///
/// Enters raw mode and the alternate screen, runs the event loop and
/// restores the terminal on exit, including when the loop fails.
pub async fn run_tui(setup: SessionSetup) -> Result<()> {
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (turn_tx, turn_rx) = mpsc::channel::<TurnRequest>(1);

    let entry_tx = ui_tx.clone();
    let mut conversation = setup.into_conversation().with_on_entry(move |entry| {
        let _ = entry_tx.send(UiEvent::Entry(entry.clone()));
    });
    conversation.append_entry(TranscriptEntry::agent(WELCOME_MESSAGE));
    let worker = tokio::spawn(run_worker(conversation, turn_rx, ui_tx));

    // --- Terminal setup ---
    enable_raw_mode().context("Failed to enable raw mode")?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = event_loop(&mut terminal, &mut ui_rx, &turn_tx).await;

    // --- Terminal teardown ---
    drop(turn_tx);
    worker.abort();
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    result
}

/// Runs queries one at a time and reports when each turn is done.
async fn run_worker(
    mut conversation: Conversation,
    mut turns: mpsc::Receiver<TurnRequest>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
) {
    while let Some(turn) = turns.recv().await {
        conversation
            .submit_query_with_cancel(&turn.query, &turn.cancel)
            .await;
        if ui_tx.send(UiEvent::TurnFinished).is_err() {
            break;
        }
    }
    debug!("conversation worker stopped");
}

async fn event_loop(
    terminal: &mut Tui,
    ui_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    turn_tx: &mpsc::Sender<TurnRequest>,
) -> Result<()> {
    let mut app = App::new();
    let mut events = EventStream::new();
    let mut tick = interval(TICK_DURATION);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                app.tick_spinner();
                terminal.draw(|f| draw(f, &app))?;
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        if !handle_key(&mut app, key, turn_tx) {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e).context("Failed to read terminal events"),
                    None => break,
                    _ => {} // ignore mouse / resize; the next tick redraws
                }
            }
            Some(event) = ui_rx.recv() => match event {
                UiEvent::Entry(entry) => app.push_entry(entry),
                UiEvent::TurnFinished => app.finish_turn(),
            },
        }
    }

    app.cancel_turn();
    Ok(())
}

/// Processes a single key event, returning `false` when the loop should exit.
fn handle_key(app: &mut App, key: KeyEvent, turn_tx: &mpsc::Sender<TurnRequest>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return false;
    }

    match key.code {
        KeyCode::Esc if app.is_busy() => app.cancel_turn(),
        KeyCode::Esc => return false,
        KeyCode::Enter => {
            if let Some(query) = app.take_query() {
                let cancel = CancellationToken::new();
                let request = TurnRequest {
                    query,
                    cancel: cancel.clone(),
                };
                // Capacity one and at most one turn in flight, so this only
                // fails if the worker is gone.
                if turn_tx.try_send(request).is_err() {
                    return false;
                }
                app.start_turn(cancel);
            }
        }
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
    true
}
