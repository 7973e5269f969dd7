//! Chat window — question feed with typed replies, status line and input.

use chrono::{DateTime, Local};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use folio_core::markup::render_lines;
use folio_core::window::WindowKind;

use super::{styled, wrap};
use crate::app::{App, FeedEntry};

const END_MESSAGE: &str = "Ask me anything about the app: features, pricing, platforms...";

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // feed
            Constraint::Length(1), // status
            Constraint::Length(1), // input
        ])
        .split(area);

    let feed = feed_lines(app, layout[0].width as usize);
    let height = layout[0].height as usize;
    let total = feed.len();
    let scroll = app.chat_scroll.min(total.saturating_sub(height));
    let end = total - scroll;
    let start = end.saturating_sub(height);
    frame.render_widget(Paragraph::new(feed[start..end].to_vec()), layout[0]);

    let status = if scroll > 0 {
        Line::styled(" Scroll to see more ↓", Style::default().fg(Color::Yellow))
    } else if !app.input_enabled {
        Line::styled(" waiting for reply...", Style::default().fg(Color::DarkGray))
    } else {
        Line::styled(
            " Enter send · Ctrl+L clear · PgUp/PgDn scroll",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(status), layout[1]);

    let input_style = if app.input_enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(format!("> {}", app.input)).style(input_style);
    frame.render_widget(input, layout[2]);

    let on_top = app.windows.windows().last().map(|w| w.kind) == Some(WindowKind::Chat);
    if app.input_enabled && on_top {
        let x = layout[2].x + 2 + app.input.chars().count() as u16;
        frame.set_cursor_position(Position::new(
            x.min(layout[2].right().saturating_sub(1)),
            layout[2].y,
        ));
    }
}

/// Wrapped feed lines, oldest first.
pub fn feed_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in &app.feed {
        lines.extend(wrap(question_line(entry), width));
        let reply = styled(&render_lines(&entry.content), Style::default().fg(Color::White));
        for line in reply {
            lines.extend(wrap(line, width));
        }
        lines.push(Line::default());
    }
    if app.end_message {
        let hint = Line::styled(END_MESSAGE, Style::default().fg(Color::DarkGray));
        lines.extend(wrap(hint, width));
    }
    lines
}

/// The question is plain text and never parsed as markup.
fn question_line(entry: &FeedEntry) -> Line<'static> {
    let time = DateTime::parse_from_rfc3339(&entry.asked_at)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();
    let who = if entry.preset { "FAQ" } else { "You" };
    Line::from(vec![
        Span::styled(format!("{} ", time), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}: {}", who, entry.question),
            Style::default().fg(Color::Cyan),
        ),
    ])
}
