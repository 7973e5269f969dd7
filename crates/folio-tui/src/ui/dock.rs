//! Dock — one button per window; click or F-key restores a minimized window.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use folio_core::window::WindowPhase;

use crate::app::{App, DOCK_SLOTS};

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (kind, label) in DOCK_SLOTS {
        let style = match app.windows.phase(kind) {
            Some(WindowPhase::Minimized) => Style::default().fg(Color::Black).bg(Color::Yellow),
            Some(WindowPhase::Minimizing) | Some(WindowPhase::Restoring) => {
                Style::default().fg(Color::Black).bg(Color::DarkGray)
            }
            _ => Style::default().fg(Color::White).bg(Color::Blue),
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
