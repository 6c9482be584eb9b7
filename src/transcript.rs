//! Transcript types for bubblechat's conversation display.
//!
//! A [`Transcript`] is the ordered, append-only record of everything shown to
//! the user during a session. Each [`TranscriptEntry`] carries an
//! [`EntryKind`] that tags its provenance and selects its display style.

use std::fmt;

/// Provenance of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A failure surfaced to the user.
    Error,
    /// Text produced by the model.
    Agent,
    /// A query typed by the user.
    User,
    /// A tool invocation requested by the model.
    Tool,
}

impl EntryKind {
    /// Prefix used by the plain-text projection.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Error => "Error",
            EntryKind::Agent => "AI",
            EntryKind::User => "User",
            EntryKind::Tool => "Tool",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single immutable entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    kind: EntryKind,
    text: String,
}

impl TranscriptEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Agent, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(EntryKind::User, text)
    }

    pub fn tool(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Tool, text)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.text)
    }
}

/// Ordered record of a session's entries. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry at the end. Entries are never reordered or removed.
    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-text projection, one string per entry, prefixed by its kind.
    pub fn render_all(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a TranscriptEntry;
    type IntoIter = std::slice::Iter<'a, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
