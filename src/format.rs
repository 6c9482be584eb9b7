//! Terminal formatting for transcript entries in line mode.

use colored::Colorize;

use crate::constants::{AGENT_RGB, ERROR_RGB, TOOL_RGB, USER_RGB};
use crate::transcript::{EntryKind, TranscriptEntry};

/// Display colour of each entry kind, shared with the TUI.
pub fn entry_rgb(kind: EntryKind) -> (u8, u8, u8) {
    match kind {
        EntryKind::Error => ERROR_RGB,
        EntryKind::Agent => AGENT_RGB,
        EntryKind::User => USER_RGB,
        EntryKind::Tool => TOOL_RGB,
    }
}

/// Format an entry for terminal display with kind label and colours.
pub fn format_entry(entry: &TranscriptEntry) -> String {
    let (r, g, b) = entry_rgb(entry.kind());
    let label = format!("{}:", entry.kind()).truecolor(r, g, b).bold();
    let body = match entry.kind() {
        EntryKind::Agent => render_markdown_lite(entry.text()),
        EntryKind::Error => entry.text().truecolor(r, g, b).to_string(),
        EntryKind::Tool => entry.text().truecolor(r, g, b).to_string(),
        EntryKind::User => entry.text().to_string(),
    };
    format!("{} {}", label, body)
}

/// Minimal markdown renderer for model output.
/// Handles **bold**, `inline code` and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(lang) = line.strip_prefix("```") {
            in_code_block = !in_code_block;
            if in_code_block && !lang.trim().is_empty() {
                lines.push(format!("  {}", lang.trim().dimmed()));
            }
            continue;
        }
        if in_code_block {
            lines.push(format!("  {}", line.dimmed()));
        } else {
            lines.push(render_inline(line));
        }
    }
    lines.join("\n")
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some((inner, after)) = delimited(rest, "**") {
            out.push_str(&inner.bold().to_string());
            rest = after;
        } else if let Some((inner, after)) = delimited(rest, "`") {
            out.push_str(&inner.dimmed().to_string());
            rest = after;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

/// If `s` opens with `marker` and closes it later, split out the enclosed text.
fn delimited<'a>(s: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let body = s.strip_prefix(marker)?;
    let end = body.find(marker)?;
    Some((&body[..end], &body[end + marker.len()..]))
}
