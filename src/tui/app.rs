//! TUI application state for bubblechat.
//!
//! Mirrors the conversation's transcript as entries arrive from the worker
//! task, and tracks the input buffer, scroll position and running turn.

use tokio_util::sync::CancellationToken;

use crate::constants::SPINNER_FRAMES;
use crate::transcript::TranscriptEntry;

/// Core application state for the TUI.
pub struct App {
    /// Entries in display order, as appended by the conversation.
    pub entries: Vec<TranscriptEntry>,
    /// Current text in the input box.
    pub input: String,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_offset: u16,
    /// Index into [`SPINNER_FRAMES`].
    pub spinner_frame: usize,
    /// Cancellation handle of the running turn, if any.
    running: Option<CancellationToken>,
}

impl App {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            scroll_offset: 0,
            spinner_frame: 0,
            running: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn push_entry(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.scroll_offset = 0;
    }

    /// Takes the input as a query. Returns `None` for blank input or while
    /// a turn is running; the input is kept in that case.
    pub fn take_query(&mut self) -> Option<String> {
        if self.is_busy() || self.input.trim().is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.input))
    }

    pub fn start_turn(&mut self, cancel: CancellationToken) {
        self.running = Some(cancel);
        self.spinner_frame = 0;
    }

    pub fn finish_turn(&mut self) {
        self.running = None;
    }

    /// Signals the running turn to stop; it stays busy until the worker
    /// reports the turn finished.
    pub fn cancel_turn(&self) {
        if let Some(cancel) = &self.running {
            cancel.cancel();
        }
    }

    pub fn tick_spinner(&mut self) {
        if self.is_busy() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Scrolls the transcript up by one line.
    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    /// Scrolls the transcript down by one line.
    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }
}
