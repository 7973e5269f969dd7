//! App state, input handling, window interaction.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use folio_core::config::Config;
use folio_core::events::SiteEvent;
use folio_core::markup::render_lines;
use folio_core::session::SessionCommand;
use folio_core::types::*;
use folio_core::window::{HitTarget, WindowKind, WindowManager, WindowPhase};

use crate::ui;

/// Rows kept free at the bottom of the screen for the dock.
pub const DOCK_ROWS: i32 = 1;

/// Width of the `[_]` control at the right end of a title row.
pub const CONTROL_WIDTH: i32 = 3;

/// A section counts as in view once this share of its rows is visible.
const SECTION_VISIBLE_RATIO: f32 = 0.3;

const SCROLL_STEP: usize = 3;

/// A question and the markup currently shown as its reply.
#[derive(Clone, Debug)]
pub struct FeedEntry {
    pub id: MessageId,
    pub question: String,
    pub content: String,
    pub preset: bool,
    pub asked_at: String,
}

/// One project block in the terminal window.
#[derive(Clone, Debug)]
pub struct TerminalSection {
    pub command: String,
    /// What the terminal currently shows for the command; None until the
    /// typing effect starts, in which case the full command is shown
    pub typed: Option<String>,
    pub info: String,
    pub info_visible: bool,
}

impl TerminalSection {
    pub fn shown_command(&self) -> &str {
        self.typed.as_deref().unwrap_or(&self.command)
    }

    /// Rows this section occupies: the prompt line plus its info, which
    /// keeps its space while hidden.
    pub fn rows(&self) -> usize {
        1 + render_lines(&self.info).len() + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Finish {
    Minimize,
    Restore,
}

#[derive(Clone, Copy, Debug)]
struct Animation {
    kind: WindowKind,
    finish: Finish,
    due: Instant,
}

/// The main application state.
pub struct App {
    pub windows: WindowManager,
    pub feed: Vec<FeedEntry>,
    pub sections: Vec<TerminalSection>,
    pub input: String,
    pub input_enabled: bool,
    /// Hint at the end of the feed until the first question
    pub end_message: bool,
    /// Lines scrolled up from the bottom of the chat feed
    pub chat_scroll: usize,
    pub terminal_scroll: usize,
    pub should_quit: bool,
    command_tx: mpsc::Sender<SessionCommand>,
    animation: Duration,
    animations: Vec<Animation>,
    requested_sections: HashSet<usize>,
}

impl App {
    pub fn new(
        config: &Config,
        projects: &[ProjectSection],
        viewport: Size,
        command_tx: mpsc::Sender<SessionCommand>,
    ) -> Self {
        let sections = projects
            .iter()
            .map(|p| TerminalSection {
                command: p.command.clone(),
                typed: None,
                info: p.info.clone(),
                info_visible: false,
            })
            .collect();

        App {
            windows: desktop(viewport),
            feed: Vec::new(),
            sections,
            input: String::new(),
            input_enabled: true,
            end_message: true,
            chat_scroll: 0,
            terminal_scroll: 0,
            should_quit: false,
            command_tx,
            animation: config.window_animation(),
            animations: Vec::new(),
            requested_sections: HashSet::new(),
        }
    }

    fn send(&self, cmd: SessionCommand) {
        if let Err(e) = self.command_tx.try_send(cmd) {
            warn!("Failed to reach session: {}", e);
        }
    }

    // ── Session events ──

    pub fn handle_event(&mut self, event: SiteEvent) {
        match event {
            SiteEvent::Message(msg) => {
                self.feed.push(FeedEntry {
                    id: msg.id,
                    question: msg.question,
                    content: msg.content,
                    preset: msg.preset,
                    asked_at: msg.asked_at,
                });
                self.chat_scroll = 0;
            }
            SiteEvent::Reveal(reveal) => {
                if let Some(id) = chat_area_id(&reveal.area) {
                    if let Some(entry) = self.feed.iter_mut().find(|e| e.id == id) {
                        entry.content = reveal.content;
                    }
                } else if let Some(i) = terminal_area_index(&reveal.area) {
                    if let Some(section) = self.sections.get_mut(i) {
                        section.typed = Some(reveal.content);
                    }
                }
            }
            SiteEvent::Scroll(scroll) => {
                if chat_area_id(&scroll.area).is_some() {
                    self.chat_scroll = 0;
                }
            }
            SiteEvent::InputGate(gate) => {
                self.input_enabled = gate.enabled;
            }
            SiteEvent::EndMessageDismissed => {
                self.end_message = false;
            }
            SiteEvent::Cleared(cleared) => {
                self.feed.retain(|e| !cleared.ids.contains(&e.id));
                self.chat_scroll = 0;
            }
            SiteEvent::ProjectInfo(info) => {
                if let Some(section) = self.sections.get_mut(info.section) {
                    section.info_visible = info.visible;
                }
            }
        }
    }

    // ── Keyboard ──

    pub fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => self.send(SessionCommand::Clear),
            (KeyCode::F(1), _) => self.toggle(WindowKind::Terminal),
            (KeyCode::F(2), _) => self.toggle(WindowKind::Chat),
            (KeyCode::Enter, _) => self.send_message(),
            (KeyCode::Char(c), m) if self.input_enabled && !m.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            (KeyCode::Backspace, _) if self.input_enabled => {
                self.input.pop();
            }
            (KeyCode::PageUp, _) => self.scroll_chat_up(SCROLL_STEP),
            (KeyCode::PageDown, _) => {
                self.chat_scroll = self.chat_scroll.saturating_sub(SCROLL_STEP)
            }
            (KeyCode::Up, _) => self.scroll_terminal_up(),
            (KeyCode::Down, _) => self.scroll_terminal_down(),
            _ => {}
        }
    }

    /// Send the typed question. Does nothing while input is gated.
    pub fn send_message(&mut self) {
        if !self.input_enabled || self.input.trim().is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.input);
        self.send(SessionCommand::Ask(text));
    }

    /// Feed rows that fit above the status and input lines of the chat window.
    fn chat_feed_size(&self) -> (usize, usize) {
        self.windows
            .rect(WindowKind::Chat)
            .map(|r| ((r.width - 2).max(0) as usize, (r.height - 4).max(0) as usize))
            .unwrap_or((0, 0))
    }

    /// Furthest the chat feed can scroll up, in lines from the bottom.
    pub fn chat_scroll_limit(&self) -> usize {
        let (width, height) = self.chat_feed_size();
        ui::chat::feed_lines(self, width).len().saturating_sub(height)
    }

    fn scroll_chat_up(&mut self, lines: usize) {
        self.chat_scroll = self
            .chat_scroll
            .saturating_add(lines)
            .min(self.chat_scroll_limit());
    }

    fn scroll_terminal_up(&mut self) {
        self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
    }

    fn scroll_terminal_down(&mut self) {
        let total: usize = self.sections.iter().map(|s| s.rows()).sum();
        if self.terminal_scroll + 1 < total {
            self.terminal_scroll += 1;
        }
    }

    // ── Mouse ──

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let p = Point {
            x: mouse.column as i32,
            y: mouse.row as i32,
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.press(p, now),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.windows.drag_to(p);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.windows.end_drag();
            }
            MouseEventKind::ScrollUp => match self.windows.window_at(p) {
                Some(WindowKind::Chat) => self.scroll_chat_up(1),
                Some(WindowKind::Terminal) => self.scroll_terminal_up(),
                None => {}
            },
            MouseEventKind::ScrollDown => match self.windows.window_at(p) {
                Some(WindowKind::Chat) => self.chat_scroll = self.chat_scroll.saturating_sub(1),
                Some(WindowKind::Terminal) => self.scroll_terminal_down(),
                None => {}
            },
            _ => {}
        }
    }

    fn press(&mut self, p: Point, now: Instant) {
        if p.y >= self.windows.viewport().height - DOCK_ROWS {
            if let Some(kind) = dock_slot_at(p.x) {
                self.toggle_at(kind, now);
            }
            return;
        }
        let Some(kind) = self.windows.window_at(p) else {
            return;
        };
        self.windows.raise(kind);
        let target = self.hit_target(kind, p);
        if target == HitTarget::Control {
            self.minimize_at(kind, now);
        } else {
            self.windows.begin_drag(kind, p, target);
        }
    }

    /// Title row is the header; the `[_]` at its right end is a control.
    pub fn hit_target(&self, kind: WindowKind, p: Point) -> HitTarget {
        let Some(r) = self.windows.rect(kind) else {
            return HitTarget::Body;
        };
        if p.y != r.y {
            return HitTarget::Body;
        }
        let control_end = r.x + r.width - 1;
        if p.x >= control_end - CONTROL_WIDTH && p.x < control_end {
            HitTarget::Control
        } else {
            HitTarget::Header
        }
    }

    // ── Minimize / restore ──

    fn toggle(&mut self, kind: WindowKind) {
        self.toggle_at(kind, Instant::now());
    }

    fn toggle_at(&mut self, kind: WindowKind, now: Instant) {
        match self.windows.phase(kind) {
            Some(WindowPhase::Minimized) => self.restore_at(kind, now),
            Some(WindowPhase::Normal) => self.minimize_at(kind, now),
            _ => {}
        }
    }

    fn minimize_at(&mut self, kind: WindowKind, now: Instant) {
        if self.windows.minimize(kind) {
            self.animate(kind, Finish::Minimize, now);
        }
    }

    fn restore_at(&mut self, kind: WindowKind, now: Instant) {
        if self.windows.restore(kind) {
            self.windows.raise(kind);
            self.animate(kind, Finish::Restore, now);
        }
    }

    fn animate(&mut self, kind: WindowKind, finish: Finish, now: Instant) {
        self.animations.push(Animation {
            kind,
            finish,
            due: now + self.animation,
        });
    }

    /// Complete window animations whose time has come.
    pub fn tick(&mut self, now: Instant) {
        let (done, pending): (Vec<_>, Vec<_>) =
            self.animations.drain(..).partition(|a| a.due <= now);
        self.animations = pending;
        for a in done {
            let finished = match a.finish {
                Finish::Minimize => self.windows.finish_minimize(a.kind),
                Finish::Restore => self.windows.finish_restore(a.kind),
            };
            debug!("{} animation {:?} finished: {}", a.kind, a.finish, finished);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.windows.set_viewport(Size {
            width: width as i32,
            height: height as i32,
        });
    }

    // ── Showcase ──

    /// Rows of the terminal window available for sections.
    pub fn terminal_body_height(&self) -> usize {
        self.windows
            .rect(WindowKind::Terminal)
            .map(|r| (r.height - 2).max(0) as usize)
            .unwrap_or(0)
    }

    /// Sections at least partly scrolled into the terminal body.
    pub fn sections_in_view(&self, body_height: usize) -> Vec<usize> {
        let top = self.terminal_scroll;
        let bottom = top + body_height;
        let mut start = 0;
        let mut in_view = Vec::new();
        for (i, s) in self.sections.iter().enumerate() {
            let rows = s.rows();
            let end = start + rows;
            let overlap = end.min(bottom).saturating_sub(start.max(top));
            if overlap as f32 >= rows as f32 * SECTION_VISIBLE_RATIO {
                in_view.push(i);
            }
            start = end;
        }
        in_view
    }

    /// Ask the session to type out newly visible sections.
    pub fn check_sections(&mut self) {
        if !self.windows.visible(WindowKind::Terminal) {
            return;
        }
        for i in self.sections_in_view(self.terminal_body_height()) {
            if self.requested_sections.insert(i) {
                self.send(SessionCommand::RevealSection(i));
            }
        }
    }
}

/// Initial layout sized to the screen.
fn desktop(viewport: Size) -> WindowManager {
    let terminal = Size {
        width: (viewport.width * 55 / 100).max(24),
        height: (viewport.height * 60 / 100).max(8),
    };
    let chat = Size {
        width: (viewport.width * 40 / 100).max(24),
        height: (viewport.height * 70 / 100).max(10),
    };
    WindowManager::desktop(viewport, DOCK_ROWS, terminal, chat)
}

// ── Dock ──

/// Dock buttons in order, with their labels.
pub const DOCK_SLOTS: [(WindowKind, &str); 2] = [
    (WindowKind::Terminal, " F1 Terminal "),
    (WindowKind::Chat, " F2 Chat "),
];

/// Column range of each dock button, separated by one space.
pub fn dock_layout() -> Vec<(WindowKind, i32, i32)> {
    let mut x = 1;
    DOCK_SLOTS
        .iter()
        .map(|(kind, label)| {
            let start = x;
            let end = start + label.chars().count() as i32;
            x = end + 1;
            (*kind, start, end)
        })
        .collect()
}

fn dock_slot_at(x: i32) -> Option<WindowKind> {
    dock_layout()
        .into_iter()
        .find(|(_, start, end)| x >= *start && x < *end)
        .map(|(kind, _, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::events::*;
    use folio_core::knowledge::KnowledgeBase;

    const VIEWPORT: Size = Size {
        width: 120,
        height: 40,
    };

    fn app() -> (App, mpsc::Receiver<SessionCommand>) {
        let (tx, rx) = mpsc::channel(16);
        let projects = KnowledgeBase::builtin().projects;
        (App::new(&Config::default(), &projects, VIEWPORT, tx), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, x: i32, y: i32) -> MouseEvent {
        MouseEvent {
            kind,
            column: x as u16,
            row: y as u16,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn message(id: MessageId, content: &str) -> SiteEvent {
        SiteEvent::Message(MessageData {
            id,
            question: format!("q{}", id),
            content: content.into(),
            preset: false,
            asked_at: "2026-01-01T00:00:00Z".into(),
        })
    }

    #[test]
    fn test_reveal_updates_matching_entry() {
        let (mut app, _rx) = app();
        app.handle_event(message(1, "<p>Thinking...</p>"));
        app.handle_event(message(2, ""));
        app.handle_event(SiteEvent::Reveal(RevealData {
            area: chat_area(1),
            content: "<p>Pri".into(),
        }));
        assert_eq!(app.feed[0].content, "<p>Pri");
        assert_eq!(app.feed[1].content, "");
    }

    #[test]
    fn test_terminal_shows_full_command_until_typing_starts() {
        let (mut app, _rx) = app();
        let command = app.sections[1].command.clone();
        assert_eq!(app.sections[1].shown_command(), command);
        app.handle_event(SiteEvent::Reveal(RevealData {
            area: terminal_area(1),
            content: String::new(),
        }));
        assert_eq!(app.sections[1].shown_command(), "");
    }

    #[test]
    fn test_cleared_removes_entries() {
        let (mut app, _rx) = app();
        app.handle_event(message(0, "a"));
        app.handle_event(message(1, "b"));
        app.handle_event(SiteEvent::Cleared(ClearedData { ids: vec![1] }));
        assert_eq!(app.feed.len(), 1);
        assert_eq!(app.feed[0].id, 0);
    }

    #[test]
    fn test_enter_sends_question() {
        let (mut app, mut rx) = app();
        for c in "price?".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.input.is_empty());
        assert!(matches!(rx.try_recv(), Ok(SessionCommand::Ask(q)) if q == "price?"));
    }

    #[test]
    fn test_gated_input_ignores_typing_and_enter() {
        let (mut app, mut rx) = app();
        app.input = "queued".into();
        app.handle_event(SiteEvent::InputGate(InputGateData { enabled: false }));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input, "queued");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_ctrl_l_clears() {
        let (mut app, mut rx) = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(matches!(rx.try_recv(), Ok(SessionCommand::Clear)));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_scroll_event_sticks_chat_to_bottom() {
        let (mut app, _rx) = app();
        for id in 0..8 {
            app.handle_event(message(id, "<p>one</p><p>two</p><p>three</p>"));
        }
        app.handle_key(key(KeyCode::PageUp));
        assert_eq!(app.chat_scroll, 3);
        app.handle_event(SiteEvent::Scroll(ScrollData {
            area: chat_area(4),
            behavior: ScrollBehavior::Instant,
        }));
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_chat_scroll_stops_at_top_of_feed() {
        let (mut app, _rx) = app();
        app.handle_key(key(KeyCode::PageUp));
        assert_eq!(app.chat_scroll, 0);

        for id in 0..8 {
            app.handle_event(message(id, "<p>one</p><p>two</p><p>three</p>"));
        }
        let limit = app.chat_scroll_limit();
        assert!(limit > SCROLL_STEP);
        for _ in 0..50 {
            app.handle_key(key(KeyCode::PageUp));
        }
        let chat = app.windows.rect(WindowKind::Chat).unwrap();
        for _ in 0..50 {
            let (x, y) = (chat.x + chat.width - 2, chat.y + chat.height - 2);
            app.handle_mouse(mouse(MouseEventKind::ScrollUp, x, y), Instant::now());
        }
        assert_eq!(app.chat_scroll, limit);

        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.chat_scroll, limit - SCROLL_STEP);
    }

    #[test]
    fn test_title_drag_moves_window() {
        let (mut app, _rx) = app();
        let before = app.windows.rect(WindowKind::Terminal).unwrap();
        let now = Instant::now();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), before.x + 2, before.y), now);
        assert_eq!(app.windows.dragging(), Some(WindowKind::Terminal));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), before.x + 5, before.y + 3), now);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), before.x + 5, before.y + 3), now);

        let after = app.windows.rect(WindowKind::Terminal).unwrap();
        assert_eq!((after.x, after.y), (before.x + 3, before.y + 3));
        assert_eq!(app.windows.dragging(), None);
    }

    #[test]
    fn test_control_click_minimizes_then_dock_restores() {
        let (mut app, _rx) = app();
        let r = app.windows.rect(WindowKind::Chat).unwrap();
        let now = Instant::now();
        let control = Point {
            x: r.x + r.width - 1 - CONTROL_WIDTH,
            y: r.y,
        };
        assert_eq!(app.hit_target(WindowKind::Chat, control), HitTarget::Control);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), control.x, control.y), now);
        assert_eq!(app.windows.phase(WindowKind::Chat), Some(WindowPhase::Minimizing));
        assert_eq!(app.windows.dragging(), None);

        app.tick(now + Duration::from_millis(499));
        assert_eq!(app.windows.phase(WindowKind::Chat), Some(WindowPhase::Minimizing));
        app.tick(now + Duration::from_millis(500));
        assert_eq!(app.windows.phase(WindowKind::Chat), Some(WindowPhase::Minimized));

        let (_, start, _) = dock_layout()[1];
        let later = now + Duration::from_secs(1);
        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), start, VIEWPORT.height - 1),
            later,
        );
        assert_eq!(app.windows.phase(WindowKind::Chat), Some(WindowPhase::Restoring));
        app.tick(later + Duration::from_millis(500));
        assert_eq!(app.windows.phase(WindowKind::Chat), Some(WindowPhase::Normal));
        assert_eq!(app.windows.rect(WindowKind::Chat), Some(r));
    }

    #[test]
    fn test_sections_in_view_threshold() {
        let (mut app, _rx) = app();
        let rows: Vec<usize> = app.sections.iter().map(|s| s.rows()).collect();
        assert_eq!(app.sections_in_view(rows[0]), vec![0]);

        app.terminal_scroll = rows[0];
        let in_view = app.sections_in_view(rows[1]);
        assert_eq!(in_view, vec![1]);
    }

    #[test]
    fn test_check_sections_requests_once() {
        let (mut app, mut rx) = app();
        app.check_sections();
        app.check_sections();
        let mut requested = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            if let SessionCommand::RevealSection(i) = cmd {
                requested.push(i);
            }
        }
        assert!(requested.contains(&0));
        let unique: HashSet<_> = requested.iter().collect();
        assert_eq!(unique.len(), requested.len());
    }

    #[test]
    fn test_dock_layout_is_contiguous() {
        let layout = dock_layout();
        assert_eq!(layout[0].1, 1);
        assert_eq!(layout[1].1, layout[0].2 + 1);
        assert_eq!(dock_slot_at(layout[0].1), Some(WindowKind::Terminal));
        assert_eq!(dock_slot_at(0), None);
    }
}
