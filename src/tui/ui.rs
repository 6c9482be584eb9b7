//! TUI drawing logic for bubblechat.
//!
//! Renders three stacked areas: the transcript, an auto-growing input box
//! and a one-line footer.

use ratatui::layout::{Constraint, Layout, Position};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::App;
use crate::constants::SPINNER_FRAMES;
use crate::format::entry_rgb;
use crate::transcript::TranscriptEntry;

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Lines for one entry: the first carries the kind label, continuation
/// lines are indented under it.
fn entry_lines(entry: &TranscriptEntry) -> Vec<Line<'_>> {
    let color = rgb(entry_rgb(entry.kind()));
    let label = format!("{}: ", entry.kind());
    let indent = " ".repeat(label.len());
    let mut lines = Vec::new();
    for (i, text) in entry.text().lines().enumerate() {
        let lead = if i == 0 {
            Span::styled(
                label.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(indent.clone())
        };
        lines.push(Line::from(vec![
            lead,
            Span::styled(text, Style::default().fg(color)),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

/// Visual rows `lines` take when wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: usize) -> usize {
    lines
        .iter()
        .map(|l| l.width().div_ceil(width.max(1)).max(1))
        .sum()
}

/// Draws the TUI frame.
///
/// The transcript stays pinned to its newest entry unless the user has
/// scrolled up. The cursor is placed at the end of the current input text.
pub fn draw(f: &mut Frame, app: &App) {
    // Inner width = total area width minus 2 for left/right borders
    let inner_width = f.area().width.saturating_sub(2).max(1) as usize;

    let visual_lines = if app.input.is_empty() {
        1
    } else {
        app.input.chars().count().div_ceil(inner_width).max(1)
    };

    // Cap the input at 40% of terminal height to protect the transcript
    let max_input_height = (f.area().height as usize * 2 / 5).max(3);
    let input_height = (visual_lines + 2).min(max_input_height) as u16;

    let [messages_area, input_area, footer_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(f.area());

    // --- Transcript pane ---
    let mut lines: Vec<Line<'_>> = Vec::new();
    for entry in &app.entries {
        lines.extend(entry_lines(entry));
        lines.push(Line::from(""));
    }

    if app.is_busy() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        lines.push(Line::from(Span::styled(
            format!("{} Working...", spinner),
            Style::default().fg(Color::Yellow),
        )));
    }

    let pane_height = messages_area.height.saturating_sub(2) as usize;
    let total = wrapped_height(&lines, inner_width);
    let top = total
        .saturating_sub(pane_height)
        .saturating_sub(app.scroll_offset as usize);

    let messages_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" BubbleChat "))
        .wrap(Wrap { trim: false })
        .scroll((top.min(u16::MAX as usize) as u16, 0));
    f.render_widget(messages_widget, messages_area);

    // --- Input box ---
    let input_widget = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(" > "))
        .wrap(Wrap { trim: false });
    f.render_widget(input_widget, input_area);

    // --- Footer ---
    let hint = if app.is_busy() {
        "Esc cancels the running turn. Ctrl+C exits."
    } else {
        "Press Ctrl+C or Esc to exit."
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        footer_area,
    );

    // Place cursor at end of input text, accounting for line wrapping.
    let iw = (input_area.width.saturating_sub(2)).max(1) as usize;
    let len = app.input.chars().count();
    let cursor_x = input_area.x + 1 + (len % iw) as u16;
    let cursor_y = input_area.y + 1 + (len / iw) as u16;
    f.set_cursor_position(Position::new(cursor_x, cursor_y));
}
