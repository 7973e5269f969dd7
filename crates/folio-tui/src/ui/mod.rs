//! TUI layout compositing — desktop, windows in stacking order, dock.

pub mod chat;
mod dock;
mod terminal;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

use folio_core::markup::MarkupLine;
use folio_core::window::{WindowKind, WindowPhase};

use crate::app::App;

/// Render the full TUI layout.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // ┌──────────────────────────────────────┐
    // │  ┌ Terminal ──[_]┐                   │
    // │  │ $ cat ...     │  ┌ Chat ──────[_]┐│
    // │  │               │  │ > question    ││
    // │  └───────────────┘  │ reply...      ││
    // │                     └───────────────┘│
    // │ F1 Terminal  F2 Chat                 │
    // └──────────────────────────────────────┘

    let desktop = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(desktop, area);

    for w in app.windows.windows() {
        if w.phase == WindowPhase::Minimized {
            continue;
        }
        let Some(rect) = app.windows.rect(w.kind).and_then(|r| clip(r, area)) else {
            continue;
        };
        let block = window_frame(w.kind, w.phase);
        let inner = block.inner(rect);
        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);

        // Animated phases draw the frame only
        if w.phase == WindowPhase::Minimizing || w.phase == WindowPhase::Restoring {
            continue;
        }
        match w.kind {
            WindowKind::Terminal => terminal::draw(frame, app, inner),
            WindowKind::Chat => chat::draw(frame, app, inner),
        }
    }

    let dock_area = Rect {
        x: area.x,
        y: area.bottom().saturating_sub(1),
        width: area.width,
        height: area.height.min(1),
    };
    dock::draw(frame, app, dock_area);
}

fn window_frame(kind: WindowKind, phase: WindowPhase) -> Block<'static> {
    let (title, accent) = match kind {
        WindowKind::Terminal => (" Terminal ", Color::Green),
        WindowKind::Chat => (" Chat ", Color::Cyan),
    };
    let border = match phase {
        WindowPhase::Dragging => Style::default().fg(Color::Yellow),
        WindowPhase::Minimizing | WindowPhase::Restoring => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(accent),
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(title).left_aligned())
        .title(Line::from("[_]").right_aligned())
}

/// Intersect a window rectangle with the screen.
fn clip(r: folio_core::types::Rect, bounds: Rect) -> Option<Rect> {
    let x0 = r.x.max(bounds.x as i32);
    let y0 = r.y.max(bounds.y as i32);
    let x1 = (r.x + r.width).min(bounds.right() as i32);
    let y1 = (r.y + r.height).min(bounds.bottom() as i32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}

/// Convert rendered markup into styled ratatui lines.
fn styled(lines: &[MarkupLine], base: Style) -> Vec<Line<'static>> {
    lines
        .iter()
        .map(|line| {
            let spans: Vec<Span> = line
                .runs
                .iter()
                .map(|run| {
                    let style = if run.bold {
                        base.add_modifier(Modifier::BOLD)
                    } else {
                        base
                    };
                    Span::styled(run.text.clone(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Hard-wrap a styled line to `width` columns.
fn wrap(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }
    let mut out = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in line.spans {
        let mut buf = String::new();
        for c in span.content.chars() {
            if used == width {
                if !buf.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut buf), span.style));
                }
                out.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            buf.push(c);
            used += 1;
        }
        if !buf.is_empty() {
            current.push(Span::styled(buf, span.style));
        }
    }
    if !current.is_empty() {
        out.push(Line::from(current));
    }
    out
}
