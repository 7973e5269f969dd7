//! Incremental revealer — types a string into an output area one character
//! per tick, pacing tag spans slightly slower than visible text.
//!
//! `RevealState` is the pure tick machine; `reveal` drives it on a tokio
//! task and returns a cancellable `RevealHandle`; `Revealer` keys active
//! reveals by output area so a new reveal aborts the previous one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;
use crate::markup::{LexMode, MarkupLexer};
use crate::types::ScrollBehavior;

/// Transient cursor appended to every chat frame.
pub const CHAT_CURSOR: &str = "<span class=\"typing-cursor\">▊</span>";

/// A display surface a reveal writes into.
pub trait OutputArea: Send + 'static {
    /// Replace the area's content.
    fn write(&self, content: &str);
    fn scroll_to_bottom(&self, behavior: ScrollBehavior);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealProfile {
    pub text_delay: Duration,
    pub tag_delay: Duration,
    /// Instant-scroll every N frames; 0 disables scrolling entirely
    pub scroll_every: u32,
    pub cursor: Option<String>,
}

impl RevealProfile {
    /// Chat replies: markup-aware pacing, cursor, periodic scrolling.
    pub fn chat(config: &Config) -> Self {
        Self {
            text_delay: Duration::from_millis(config.text_delay_ms),
            tag_delay: Duration::from_millis(config.tag_delay_ms),
            scroll_every: config.scroll_every,
            cursor: Some(CHAT_CURSOR.to_string()),
        }
    }

    /// Terminal commands: plain text at a steady pace.
    pub fn command(config: &Config) -> Self {
        let delay = Duration::from_millis(config.command_char_delay_ms);
        Self {
            text_delay: delay,
            tag_delay: delay,
            scroll_every: 0,
            cursor: None,
        }
    }

    pub fn scrolls(&self) -> bool {
        self.scroll_every > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPhase {
    Idle,
    Running,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep {
    /// Partial content with the cursor marker, and the wait before the next tick.
    Frame {
        content: String,
        scroll: Option<ScrollBehavior>,
        next_delay: Duration,
    },
    /// The exact source text; no further ticks.
    Complete { content: String },
}

#[derive(Debug, Clone)]
pub struct RevealState {
    source: String,
    emitted: String,
    /// Characters emitted so far
    cursor_index: usize,
    /// Byte offset of the next character in `source`
    offset: usize,
    lexer: MarkupLexer,
    frames: u32,
    phase: RevealPhase,
}

impl RevealState {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            emitted: String::new(),
            cursor_index: 0,
            offset: 0,
            lexer: MarkupLexer::new(),
            frames: 0,
            phase: RevealPhase::Idle,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }

    pub fn emitted(&self) -> &str {
        &self.emitted
    }

    pub fn mode(&self) -> LexMode {
        self.lexer.mode()
    }

    pub fn tick(&mut self, profile: &RevealProfile) -> RevealStep {
        let Some(ch) = self.source[self.offset..].chars().next() else {
            self.phase = RevealPhase::Complete;
            return RevealStep::Complete {
                content: self.source.clone(),
            };
        };
        self.phase = RevealPhase::Running;

        self.emitted.push(ch);
        self.offset += ch.len_utf8();
        self.cursor_index += 1;
        self.frames += 1;

        let mut content = self.emitted.clone();
        if let Some(cursor) = &profile.cursor {
            content.push_str(cursor);
        }

        let scroll = (profile.scrolls() && self.frames % profile.scroll_every == 0)
            .then_some(ScrollBehavior::Instant);

        let next_delay = match self.lexer.feed(ch) {
            LexMode::InTag => profile.tag_delay,
            LexMode::InText => profile.text_delay,
        };

        RevealStep::Frame {
            content,
            scroll,
            next_delay,
        }
    }
}

/// Cancellation flag shared by a reveal task and its handle. Area output
/// happens while the flag is locked, so `cancel` waits out a write that
/// is already underway on another worker.
#[derive(Debug, Clone, Default)]
struct CancelGuard {
    cancelled: Arc<Mutex<bool>>,
}

impl CancelGuard {
    fn cancel(&self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    /// Run `f` unless cancelled.
    fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let cancelled = self.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        if *cancelled {
            return None;
        }
        Some(f())
    }
}

/// Handle to a running reveal task.
#[derive(Debug)]
pub struct RevealHandle {
    task: JoinHandle<()>,
    guard: CancelGuard,
}

impl RevealHandle {
    /// Stop the reveal. A cancelled reveal never writes again and never
    /// calls its completion callback. If a write is in progress, this
    /// blocks until it returns.
    pub fn cancel(&self) {
        self.guard.cancel();
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the reveal to end, either completed or cancelled.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Reveal `source` into `area`, calling `on_complete` once the final
/// content has been written. The first tick runs immediately.
pub fn reveal<A, F>(area: A, source: String, profile: RevealProfile, on_complete: F) -> RevealHandle
where
    A: OutputArea,
    F: FnOnce() + Send + 'static,
{
    let guard = CancelGuard::default();
    let task_guard = guard.clone();
    let task = tokio::spawn(async move {
        let mut state = RevealState::new(source);
        loop {
            match state.tick(&profile) {
                RevealStep::Frame {
                    content,
                    scroll,
                    next_delay,
                } => {
                    let written = task_guard.run(|| {
                        area.write(&content);
                        if let Some(behavior) = scroll {
                            area.scroll_to_bottom(behavior);
                        }
                    });
                    if written.is_none() {
                        return;
                    }
                    tokio::time::sleep(next_delay).await;
                }
                RevealStep::Complete { content } => {
                    let scrolls = profile.scrolls();
                    task_guard.run(move || {
                        area.write(&content);
                        if scrolls {
                            area.scroll_to_bottom(ScrollBehavior::Smooth);
                        }
                        on_complete();
                    });
                    return;
                }
            }
        }
    });
    RevealHandle { task, guard }
}

/// Active reveals keyed by output area id.
#[derive(Debug, Default)]
pub struct Revealer {
    active: HashMap<String, RevealHandle>,
}

impl Revealer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a reveal on `area_id`, aborting any reveal still running there.
    pub fn start<A, F>(
        &mut self,
        area_id: &str,
        area: A,
        source: String,
        profile: RevealProfile,
        on_complete: F,
    ) where
        A: OutputArea,
        F: FnOnce() + Send + 'static,
    {
        self.active.retain(|_, h| !h.is_finished());
        if let Some(prior) = self.active.remove(area_id) {
            debug!("Restarting reveal on {}", area_id);
            prior.cancel();
        }
        let handle = reveal(area, source, profile, on_complete);
        self.active.insert(area_id.to_string(), handle);
    }

    pub fn cancel(&mut self, area_id: &str) -> bool {
        match self.active.remove(area_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.cancel();
        }
    }

    pub fn is_active(&self, area_id: &str) -> bool {
        self.active
            .get(area_id)
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Revealer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Write(String),
        Scroll(ScrollBehavior),
        Done,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        ops: Arc<Mutex<Vec<Op>>>,
    }

    impl Recorder {
        fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }

        fn writes(&self) -> Vec<String> {
            self.ops()
                .into_iter()
                .filter_map(|op| match op {
                    Op::Write(s) => Some(s),
                    _ => None,
                })
                .collect()
        }

        fn done(&self) -> impl FnOnce() + Send + 'static {
            let ops = self.ops.clone();
            move || ops.lock().unwrap().push(Op::Done)
        }
    }

    impl OutputArea for Recorder {
        fn write(&self, content: &str) {
            self.ops.lock().unwrap().push(Op::Write(content.to_string()));
        }

        fn scroll_to_bottom(&self, behavior: ScrollBehavior) {
            self.ops.lock().unwrap().push(Op::Scroll(behavior));
        }
    }

    fn profile(cursor: &str) -> RevealProfile {
        RevealProfile {
            text_delay: Duration::from_millis(18),
            tag_delay: Duration::from_millis(25),
            scroll_every: 3,
            cursor: Some(cursor.to_string()),
        }
    }

    #[test]
    fn test_tick_sequence_for_ab() {
        let p = profile("|");
        let mut state = RevealState::new("ab");
        assert_eq!(state.phase(), RevealPhase::Idle);

        let RevealStep::Frame { content, .. } = state.tick(&p) else {
            panic!("expected frame");
        };
        assert_eq!(content, "a|");
        assert_eq!(state.phase(), RevealPhase::Running);

        let RevealStep::Frame { content, .. } = state.tick(&p) else {
            panic!("expected frame");
        };
        assert_eq!(content, "ab|");

        assert_eq!(
            state.tick(&p),
            RevealStep::Complete {
                content: "ab".into()
            }
        );
        assert_eq!(state.phase(), RevealPhase::Complete);
        assert_eq!(state.cursor_index(), 2);
    }

    #[test]
    fn test_tag_spans_use_tag_delay() {
        let p = profile("");
        let mut state = RevealState::new("a<b>c");
        let delays: Vec<Duration> = std::iter::from_fn(|| match state.tick(&p) {
            RevealStep::Frame { next_delay, .. } => Some(next_delay),
            RevealStep::Complete { .. } => None,
        })
        .collect();
        let ms: Vec<u128> = delays.iter().map(|d| d.as_millis()).collect();
        // a, <, b, >, c
        assert_eq!(ms, vec![18, 25, 25, 18, 18]);
    }

    #[test]
    fn test_state_tracks_emitted_text_and_lexer_mode() {
        let p = profile("|");
        let mut state = RevealState::new("a<b>");
        state.tick(&p);
        assert_eq!(state.emitted(), "a");
        assert_eq!(state.mode(), LexMode::InText);

        state.tick(&p);
        assert_eq!(state.emitted(), "a<");
        assert_eq!(state.mode(), LexMode::InTag);

        state.tick(&p);
        state.tick(&p);
        assert_eq!(state.emitted(), "a<b>");
        assert_eq!(state.mode(), LexMode::InText);
    }

    #[test]
    fn test_scroll_every_third_frame() {
        let p = profile("");
        let mut state = RevealState::new("abcdefg");
        let scrolls: Vec<bool> = std::iter::from_fn(|| match state.tick(&p) {
            RevealStep::Frame { scroll, .. } => Some(scroll.is_some()),
            RevealStep::Complete { .. } => None,
        })
        .collect();
        assert_eq!(scrolls, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_multibyte_chars_are_single_ticks() {
        let p = profile("");
        let mut state = RevealState::new("é▊");
        assert!(matches!(state.tick(&p), RevealStep::Frame { ref content, .. } if content == "é"));
        assert!(matches!(state.tick(&p), RevealStep::Frame { ref content, .. } if content == "é▊"));
        assert!(matches!(state.tick(&p), RevealStep::Complete { .. }));
    }

    #[test]
    fn test_empty_source_completes_immediately() {
        let mut state = RevealState::new("");
        assert_eq!(
            state.tick(&profile("|")),
            RevealStep::Complete {
                content: String::new()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_writes_frames_then_final() {
        let area = Recorder::default();
        let handle = reveal(area.clone(), "ab".into(), profile("|"), area.done());
        handle.join().await;

        assert_eq!(
            area.ops(),
            vec![
                Op::Write("a|".into()),
                Op::Write("ab|".into()),
                Op::Write("ab".into()),
                Op::Scroll(ScrollBehavior::Smooth),
                Op::Done,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_write_equals_source() {
        let source = "<p><strong>Pricing</strong></p>\n<ul><li>Free</li></ul>".to_string();
        let area = Recorder::default();
        reveal(area.clone(), source.clone(), profile(CHAT_CURSOR), || {})
            .join()
            .await;

        let writes = area.writes();
        assert_eq!(writes.last().unwrap(), &source);
        assert_eq!(writes.len(), source.chars().count() + 1);
        for w in &writes[..writes.len() - 1] {
            assert!(w.ends_with(CHAT_CURSOR));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_timing_follows_delays() {
        let area = Recorder::default();
        let start = Instant::now();
        // a(18) <(25) b(25) >(18) then complete
        reveal(area.clone(), "a<b>".into(), profile(""), || {})
            .join()
            .await;
        assert_eq!(start.elapsed(), Duration::from_millis(18 + 25 + 25 + 18));
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_profile_never_scrolls() {
        let area = Recorder::default();
        let config = Config::default();
        reveal(area.clone(), "ls -la".into(), RevealProfile::command(&config), || {})
            .join()
            .await;
        assert!(area.ops().iter().all(|op| matches!(op, Op::Write(_))));
        assert_eq!(area.writes().first().unwrap(), "l");
        assert_eq!(area.writes().last().unwrap(), "ls -la");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_completion() {
        let area = Recorder::default();
        let handle = reveal(area.clone(), "abcdef".into(), profile("|"), area.done());
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        handle.join().await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        let ops = area.ops();
        assert!(!ops.contains(&Op::Done));
        assert!(!area.writes().contains(&"abcdef".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_on_same_area_aborts_prior() {
        let first = Recorder::default();
        let second = Recorder::default();
        let completions = Arc::new(AtomicUsize::new(0));
        let mut revealer = Revealer::new();

        let c = completions.clone();
        revealer.start("chat:1", first.clone(), "first reply".into(), profile("|"), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(40)).await;

        let c = completions.clone();
        revealer.start("chat:1", second.clone(), "second".into(), profile("|"), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_ne!(first.writes().last().unwrap(), "first reply");
        assert_eq!(second.writes().last().unwrap(), "second");
        assert!(!revealer.is_active("chat:1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_areas_run_side_by_side() {
        let a = Recorder::default();
        let b = Recorder::default();
        let mut revealer = Revealer::new();
        revealer.start("chat:1", a.clone(), "one".into(), profile(""), a.done());
        revealer.start("chat:2", b.clone(), "two".into(), profile(""), b.done());
        assert!(revealer.is_active("chat:1"));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(a.writes().last().unwrap(), "one");
        assert_eq!(b.writes().last().unwrap(), "two");
        assert!(!revealer.cancel("chat:3"));
    }

    /// Area whose final write blocks, so a cancel can land mid-write.
    #[derive(Clone, Default)]
    struct SlowFinal {
        recorder: Recorder,
        final_started: Arc<AtomicBool>,
    }

    impl OutputArea for SlowFinal {
        fn write(&self, content: &str) {
            if content == "a" {
                self.final_started.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
            }
            self.recorder.write(content);
        }

        fn scroll_to_bottom(&self, behavior: ScrollBehavior) {
            self.recorder.scroll_to_bottom(behavior);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_during_write_on_another_worker() {
        let area = SlowFinal::default();
        let handle = reveal(area.clone(), "a".into(), profile("|"), area.recorder.done());

        while !area.final_started.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        handle.cancel();
        let at_cancel = area.recorder.ops();
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(area.recorder.ops(), at_cancel);
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_reveal_stops_writing_on_multi_thread() {
        let area = Recorder::default();
        let handle = reveal(
            area.clone(),
            "a fairly long reply that keeps typing".into(),
            profile("|"),
            area.done(),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
        let at_cancel = area.ops();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(area.ops(), at_cancel);
        assert!(!at_cancel.contains(&Op::Done));
    }
}
