//! Terminal window — project sections with their typed commands.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use folio_core::markup::render_lines;

use super::styled;
use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for section in &app.sections {
        lines.push(Line::from(vec![
            Span::styled("$ ", Style::default().fg(Color::Green)),
            Span::styled(
                section.shown_command().to_string(),
                Style::default().fg(Color::White),
            ),
        ]));

        // Hidden info keeps its rows so the layout does not jump
        let info = render_lines(&section.info);
        if section.info_visible {
            lines.extend(styled(&info, Style::default().fg(Color::Gray)));
        } else {
            lines.extend(info.iter().map(|_| Line::default()));
        }
        lines.push(Line::default());
    }

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(app.terminal_scroll)
        .take(area.height as usize)
        .collect();
    frame.render_widget(Paragraph::new(visible), area);
}
