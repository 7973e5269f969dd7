//! Desktop window state for the page — drag and minimize/restore phases in
//! CSS pixels. Mirrors the server-side window manager; the wasm build
//! cannot link the core crate's tokio runtime.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    Terminal,
    Chat,
}

impl WindowKind {
    pub fn id(self) -> &'static str {
        match self {
            WindowKind::Terminal => "terminal",
            WindowKind::Chat => "chat",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WindowKind::Terminal => "Terminal",
            WindowKind::Chat => "Chat",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Normal,
    Dragging,
    Minimizing,
    Minimized,
    Restoring,
}

impl Phase {
    pub fn class(self) -> &'static str {
        match self {
            Phase::Normal => "",
            Phase::Dragging => "dragging",
            Phase::Minimizing => "minimizing",
            Phase::Minimized => "minimized",
            Phase::Restoring => "restoring",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Win {
    pub kind: WindowKind,
    /// Positioned from the right edge instead of the left
    pub right: bool,
    pub offset: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    kind: WindowKind,
    x: f64,
    y: f64,
    offset: f64,
    top: f64,
}

/// Pixels kept free at the bottom for the dock.
pub const DOCK_RESERVE: f64 = 64.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Desktop {
    /// Stacking order, last on top
    wins: Vec<Win>,
    width: f64,
    height: f64,
    grab: Option<Grab>,
}

impl Desktop {
    pub fn new(width: f64, height: f64) -> Self {
        let terminal = Win {
            kind: WindowKind::Terminal,
            right: false,
            offset: width * 0.05,
            top: height * 0.10,
            width: 560f64.min(width),
            height: 380f64.min(height),
            phase: Phase::Normal,
        };
        let chat = Win {
            kind: WindowKind::Chat,
            right: true,
            offset: width * 0.05,
            top: height * 0.15,
            width: 420f64.min(width),
            height: 520f64.min(height),
            phase: Phase::Normal,
        };
        Self {
            wins: vec![terminal, chat],
            width,
            height,
            grab: None,
        }
    }

    pub fn get(&self, kind: WindowKind) -> Option<&Win> {
        self.wins.iter().find(|w| w.kind == kind)
    }

    fn get_mut(&mut self, kind: WindowKind) -> Option<&mut Win> {
        self.wins.iter_mut().find(|w| w.kind == kind)
    }

    pub fn phase(&self, kind: WindowKind) -> Phase {
        self.get(kind).map(|w| w.phase).unwrap_or(Phase::Minimized)
    }

    pub fn raise(&mut self, kind: WindowKind) {
        if let Some(pos) = self.wins.iter().position(|w| w.kind == kind) {
            let w = self.wins.remove(pos);
            self.wins.push(w);
        }
    }

    /// Inline CSS placing a window on the page.
    pub fn style(&self, kind: WindowKind) -> String {
        let Some(z) = self.wins.iter().position(|w| w.kind == kind) else {
            return String::new();
        };
        let w = &self.wins[z];
        let edge = if w.right { "right" } else { "left" };
        format!(
            "{}: {}px; top: {}px; width: {}px; height: {}px; z-index: {};",
            edge,
            w.offset,
            w.top,
            w.width,
            w.height,
            10 + z
        )
    }

    // ── Dragging ──

    /// Start a header drag. Refused while another window is dragging or
    /// the window is not at rest.
    pub fn begin_drag(&mut self, kind: WindowKind, x: f64, y: f64) -> bool {
        if self.grab.is_some() {
            return false;
        }
        let Some(w) = self.get_mut(kind) else {
            return false;
        };
        if w.phase != Phase::Normal {
            return false;
        }
        w.phase = Phase::Dragging;
        let (offset, top) = (w.offset, w.top);
        self.grab = Some(Grab {
            kind,
            x,
            y,
            offset,
            top,
        });
        self.raise(kind);
        true
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        let Some(grab) = self.grab else {
            return;
        };
        let (vw, vh) = (self.width, self.height);
        let Some(w) = self.get_mut(grab.kind) else {
            return;
        };
        let dx = x - grab.x;
        let offset = if w.right { grab.offset - dx } else { grab.offset + dx };
        w.offset = clamp(offset, vw - w.width);
        w.top = clamp(grab.top + y - grab.y, vh - w.height - DOCK_RESERVE);
    }

    pub fn end_drag(&mut self) {
        if let Some(grab) = self.grab.take() {
            if let Some(w) = self.get_mut(grab.kind) {
                w.phase = Phase::Normal;
            }
        }
    }

    // ── Minimize / restore ──

    pub fn minimize(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, Phase::Normal, Phase::Minimizing)
    }

    pub fn finish_minimize(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, Phase::Minimizing, Phase::Minimized)
    }

    pub fn restore(&mut self, kind: WindowKind) -> bool {
        let ok = self.transition(kind, Phase::Minimized, Phase::Restoring);
        if ok {
            self.raise(kind);
        }
        ok
    }

    pub fn finish_restore(&mut self, kind: WindowKind) -> bool {
        self.transition(kind, Phase::Restoring, Phase::Normal)
    }

    fn transition(&mut self, kind: WindowKind, from: Phase, to: Phase) -> bool {
        match self.get_mut(kind) {
            Some(w) if w.phase == from => {
                w.phase = to;
                true
            }
            _ => false,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        for w in &mut self.wins {
            w.offset = clamp(w.offset, width - w.width);
            w.top = clamp(w.top, height - w.height - DOCK_RESERVE);
        }
    }
}

fn clamp(v: f64, max: f64) -> f64 {
    v.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_right_anchored_window() {
        let mut d = Desktop::new(1000.0, 800.0);
        let before = d.get(WindowKind::Chat).unwrap().offset;
        assert!(d.begin_drag(WindowKind::Chat, 500.0, 200.0));
        assert!(!d.begin_drag(WindowKind::Terminal, 10.0, 10.0));
        d.drag_to(450.0, 200.0);
        d.end_drag();
        let w = d.get(WindowKind::Chat).unwrap();
        assert_eq!(w.offset, before + 50.0);
        assert_eq!(w.phase, Phase::Normal);
    }

    #[test]
    fn test_drag_clamps_above_dock() {
        let mut d = Desktop::new(1000.0, 800.0);
        d.begin_drag(WindowKind::Terminal, 0.0, 0.0);
        d.drag_to(-5000.0, 5000.0);
        let w = d.get(WindowKind::Terminal).unwrap();
        assert_eq!(w.offset, 0.0);
        assert_eq!(w.top, 800.0 - 380.0 - DOCK_RESERVE);
    }

    #[test]
    fn test_minimized_window_cannot_drag() {
        let mut d = Desktop::new(1000.0, 800.0);
        assert!(d.minimize(WindowKind::Chat));
        assert!(!d.begin_drag(WindowKind::Chat, 0.0, 0.0));
        assert!(d.finish_minimize(WindowKind::Chat));
        assert!(!d.minimize(WindowKind::Chat));
        assert!(d.restore(WindowKind::Chat));
        assert!(d.finish_restore(WindowKind::Chat));
        assert_eq!(d.phase(WindowKind::Chat), Phase::Normal);
    }
}
