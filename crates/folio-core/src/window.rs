//! Window manager — per-window state machines for the desktop chrome.
//!
//! Each window is anchored to the left or right edge and moves through
//! `Normal -> Dragging -> Normal` and
//! `Normal -> Minimizing -> Minimized -> Restoring -> Normal`.
//! Timing of the animated phases is left to the frontend, which calls the
//! `finish_*` transitions when its animation ends.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Terminal,
    Chat,
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowKind::Terminal => write!(f, "terminal"),
            WindowKind::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowPhase {
    Normal,
    Dragging,
    Minimizing,
    Minimized,
    Restoring,
}

/// What a pointer press landed on inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Title bar: starts a drag
    Header,
    /// Minimize button or other header controls: never starts a drag
    Control,
    Body,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    pub kind: WindowKind,
    pub anchor: Anchor,
    /// Distance from the anchored edge
    pub offset: i32,
    pub top: i32,
    pub size: Size,
    pub phase: WindowPhase,
}

#[derive(Debug, Clone, Copy)]
struct Grab {
    kind: WindowKind,
    pointer: Point,
    offset: i32,
    top: i32,
}

#[derive(Debug, Clone)]
pub struct WindowManager {
    windows: Vec<Window>,
    viewport: Size,
    /// Rows/pixels kept free above the bottom edge for the dock
    dock_reserve: i32,
    grab: Option<Grab>,
}

impl WindowManager {
    pub fn new(viewport: Size, dock_reserve: i32) -> Self {
        Self {
            windows: Vec::new(),
            viewport,
            dock_reserve,
            grab: None,
        }
    }

    /// Standard two-window desktop: terminal 5% from the left and 10% from
    /// the top, chat 5% from the right and 15% from the top.
    pub fn desktop(viewport: Size, dock_reserve: i32, terminal: Size, chat: Size) -> Self {
        let mut wm = Self::new(viewport, dock_reserve);
        wm.add(
            WindowKind::Terminal,
            Anchor::Left,
            terminal,
            viewport.width * 5 / 100,
            viewport.height * 10 / 100,
        );
        wm.add(
            WindowKind::Chat,
            Anchor::Right,
            chat,
            viewport.width * 5 / 100,
            viewport.height * 15 / 100,
        );
        wm
    }

    pub fn add(&mut self, kind: WindowKind, anchor: Anchor, size: Size, offset: i32, top: i32) {
        self.windows.retain(|w| w.kind != kind);
        self.windows.push(Window {
            kind,
            anchor,
            offset,
            top,
            size,
            phase: WindowPhase::Normal,
        });
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, kind: WindowKind) -> Option<&Window> {
        self.windows.iter().find(|w| w.kind == kind)
    }

    fn window_mut(&mut self, kind: WindowKind) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.kind == kind)
    }

    pub fn phase(&self, kind: WindowKind) -> Option<WindowPhase> {
        self.window(kind).map(|w| w.phase)
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Absolute rectangle of a window in viewport coordinates.
    pub fn rect(&self, kind: WindowKind) -> Option<Rect> {
        let w = self.window(kind)?;
        let x = match w.anchor {
            Anchor::Left => w.offset,
            Anchor::Right => self.viewport.width - w.offset - w.size.width,
        };
        Some(Rect {
            x,
            y: w.top,
            width: w.size.width,
            height: w.size.height,
        })
    }

    /// Whether a window is drawn at all. Animated phases still draw.
    pub fn visible(&self, kind: WindowKind) -> bool {
        self.phase(kind)
            .is_some_and(|p| p != WindowPhase::Minimized)
    }

    /// Topmost visible window under a point; later windows draw on top.
    pub fn window_at(&self, p: Point) -> Option<WindowKind> {
        self.windows
            .iter()
            .rev()
            .filter(|w| w.phase != WindowPhase::Minimized)
            .find(|w| self.rect(w.kind).is_some_and(|r| r.contains(p)))
            .map(|w| w.kind)
    }

    /// Move a window to the top of the stacking order.
    pub fn raise(&mut self, kind: WindowKind) {
        if let Some(pos) = self.windows.iter().position(|w| w.kind == kind) {
            let w = self.windows.remove(pos);
            self.windows.push(w);
        }
    }

    pub fn dragging(&self) -> Option<WindowKind> {
        self.grab.map(|g| g.kind)
    }

    // ── Dragging ──

    pub fn begin_drag(&mut self, kind: WindowKind, pointer: Point, target: HitTarget) -> bool {
        if target != HitTarget::Header {
            return false;
        }
        if self.grab.is_some() {
            debug!("Ignoring drag of {}: another window is being dragged", kind);
            return false;
        }
        let Some(w) = self.window_mut(kind) else {
            return false;
        };
        if w.phase != WindowPhase::Normal {
            return false;
        }
        w.phase = WindowPhase::Dragging;
        let (offset, top) = (w.offset, w.top);
        self.grab = Some(Grab {
            kind,
            pointer,
            offset,
            top,
        });
        self.raise(kind);
        true
    }

    /// Follow the pointer, keeping the window inside the viewport and above
    /// the dock. Returns the new rectangle, or None if nothing is dragging.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Rect> {
        let grab = self.grab?;
        let viewport = self.viewport;
        let dock_reserve = self.dock_reserve;
        let w = self.window_mut(grab.kind)?;

        let dx = pointer.x - grab.pointer.x;
        let dy = pointer.y - grab.pointer.y;
        let offset = match w.anchor {
            Anchor::Left => grab.offset + dx,
            Anchor::Right => grab.offset - dx,
        };
        let top = grab.top + dy;

        w.offset = clamp(offset, viewport.width - w.size.width);
        w.top = clamp(top, viewport.height - w.size.height - dock_reserve);
        self.rect(grab.kind)
    }

    pub fn end_drag(&mut self) -> bool {
        let Some(grab) = self.grab.take() else {
            return false;
        };
        if let Some(w) = self.window_mut(grab.kind) {
            w.phase = WindowPhase::Normal;
        }
        true
    }

    // ── Minimize / restore ──

    pub fn minimize(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, WindowPhase::Normal, WindowPhase::Minimizing)
    }

    pub fn finish_minimize(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, WindowPhase::Minimizing, WindowPhase::Minimized)
    }

    /// Restore a minimized window to its last position.
    pub fn restore(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, WindowPhase::Minimized, WindowPhase::Restoring)
    }

    pub fn finish_restore(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, WindowPhase::Restoring, WindowPhase::Normal)
    }

    fn transition(&mut self, kind: WindowKind, from: WindowPhase, to: WindowPhase) -> bool {
        match self.window_mut(kind) {
            Some(w) if w.phase == from => {
                debug!("{}: {:?} -> {:?}", kind, from, to);
                w.phase = to;
                true
            }
            _ => false,
        }
    }

    /// Resize the viewport, pulling windows back inside it.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let dock_reserve = self.dock_reserve;
        for w in &mut self.windows {
            w.offset = clamp(w.offset, viewport.width - w.size.width);
            w.top = clamp(w.top, viewport.height - w.size.height - dock_reserve);
        }
    }
}

/// `max(0, min(v, max))`: a negative max pins to the origin.
fn clamp(v: i32, max: i32) -> i32 {
    v.min(max).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wm() -> WindowManager {
        WindowManager::desktop(
            Size { width: 200, height: 100 },
            10,
            Size { width: 60, height: 30 },
            Size { width: 50, height: 40 },
        )
    }

    #[test]
    fn test_desktop_layout() {
        let wm = wm();
        assert_eq!(
            wm.rect(WindowKind::Terminal),
            Some(Rect { x: 10, y: 10, width: 60, height: 30 })
        );
        // right-anchored: 200 - 10 - 50
        assert_eq!(
            wm.rect(WindowKind::Chat),
            Some(Rect { x: 140, y: 15, width: 50, height: 40 })
        );
    }

    #[test]
    fn test_drag_left_anchored() {
        let mut wm = wm();
        assert!(wm.begin_drag(WindowKind::Terminal, Point { x: 20, y: 10 }, HitTarget::Header));
        assert_eq!(wm.phase(WindowKind::Terminal), Some(WindowPhase::Dragging));
        let r = wm.drag_to(Point { x: 25, y: 13 }).unwrap();
        assert_eq!((r.x, r.y), (15, 13));
        assert!(wm.end_drag());
        assert_eq!(wm.phase(WindowKind::Terminal), Some(WindowPhase::Normal));
    }

    #[test]
    fn test_drag_right_anchored_moves_with_pointer() {
        let mut wm = wm();
        assert!(wm.begin_drag(WindowKind::Chat, Point { x: 150, y: 15 }, HitTarget::Header));
        let r = wm.drag_to(Point { x: 140, y: 15 }).unwrap();
        // pointer moved left by 10, so the right offset grows by 10
        assert_eq!(wm.window(WindowKind::Chat).unwrap().offset, 20);
        assert_eq!(r.x, 130);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut wm = wm();
        wm.begin_drag(WindowKind::Terminal, Point { x: 20, y: 10 }, HitTarget::Header);
        let r = wm.drag_to(Point { x: -500, y: -500 }).unwrap();
        assert_eq!((r.x, r.y), (0, 0));
        let r = wm.drag_to(Point { x: 900, y: 900 }).unwrap();
        // 200 - 60, and 100 - 30 - 10 for the dock
        assert_eq!((r.x, r.y), (140, 60));
    }

    #[test]
    fn test_oversized_window_pins_to_origin() {
        let mut wm = WindowManager::new(Size { width: 40, height: 20 }, 5);
        wm.add(WindowKind::Terminal, Anchor::Left, Size { width: 60, height: 30 }, 3, 3);
        wm.begin_drag(WindowKind::Terminal, Point { x: 5, y: 3 }, HitTarget::Header);
        let r = wm.drag_to(Point { x: 10, y: 8 }).unwrap();
        assert_eq!((r.x, r.y), (0, 0));
    }

    #[test]
    fn test_control_press_does_not_drag() {
        let mut wm = wm();
        assert!(!wm.begin_drag(WindowKind::Terminal, Point { x: 11, y: 10 }, HitTarget::Control));
        assert!(!wm.begin_drag(WindowKind::Terminal, Point { x: 11, y: 12 }, HitTarget::Body));
        assert_eq!(wm.dragging(), None);
        assert!(wm.drag_to(Point { x: 0, y: 0 }).is_none());
    }

    #[test]
    fn test_single_drag_at_a_time() {
        let mut wm = wm();
        assert!(wm.begin_drag(WindowKind::Terminal, Point { x: 20, y: 10 }, HitTarget::Header));
        assert!(!wm.begin_drag(WindowKind::Chat, Point { x: 150, y: 15 }, HitTarget::Header));
        assert_eq!(wm.dragging(), Some(WindowKind::Terminal));
    }

    #[test]
    fn test_minimize_restore_cycle() {
        let mut wm = wm();
        assert!(wm.minimize(WindowKind::Chat));
        assert!(!wm.minimize(WindowKind::Chat));
        assert!(wm.visible(WindowKind::Chat));
        assert!(!wm.restore(WindowKind::Chat));
        assert!(wm.finish_minimize(WindowKind::Chat));
        assert!(!wm.visible(WindowKind::Chat));
        assert!(!wm.minimize(WindowKind::Chat));
        assert!(wm.restore(WindowKind::Chat));
        assert!(wm.finish_restore(WindowKind::Chat));
        assert_eq!(wm.phase(WindowKind::Chat), Some(WindowPhase::Normal));
    }

    #[test]
    fn test_restore_keeps_dragged_position() {
        let mut wm = wm();
        wm.begin_drag(WindowKind::Terminal, Point { x: 20, y: 10 }, HitTarget::Header);
        wm.drag_to(Point { x: 50, y: 30 });
        wm.end_drag();
        let before = wm.rect(WindowKind::Terminal);
        wm.minimize(WindowKind::Terminal);
        wm.finish_minimize(WindowKind::Terminal);
        wm.restore(WindowKind::Terminal);
        wm.finish_restore(WindowKind::Terminal);
        assert_eq!(wm.rect(WindowKind::Terminal), before);
    }

    #[test]
    fn test_cannot_drag_minimizing_window() {
        let mut wm = wm();
        wm.minimize(WindowKind::Terminal);
        assert!(!wm.begin_drag(WindowKind::Terminal, Point { x: 20, y: 10 }, HitTarget::Header));
    }

    #[test]
    fn test_window_at_respects_stacking_and_minimized() {
        let mut wm = WindowManager::new(Size { width: 100, height: 100 }, 0);
        wm.add(WindowKind::Terminal, Anchor::Left, Size { width: 50, height: 50 }, 0, 0);
        wm.add(WindowKind::Chat, Anchor::Left, Size { width: 50, height: 50 }, 20, 20);
        let overlap = Point { x: 30, y: 30 };
        assert_eq!(wm.window_at(overlap), Some(WindowKind::Chat));
        wm.raise(WindowKind::Terminal);
        assert_eq!(wm.window_at(overlap), Some(WindowKind::Terminal));
        wm.minimize(WindowKind::Terminal);
        wm.finish_minimize(WindowKind::Terminal);
        assert_eq!(wm.window_at(overlap), Some(WindowKind::Chat));
    }

    #[test]
    fn test_set_viewport_pulls_windows_inside() {
        let mut wm = wm();
        wm.set_viewport(Size { width: 80, height: 50 });
        let r = wm.rect(WindowKind::Terminal).unwrap();
        assert!(r.x + r.width <= 80);
        assert!(r.y + r.height <= 50 - 10 || r.y == 0);
    }
}
