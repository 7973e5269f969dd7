//! Folio WASM frontend — Dioxus app root.

mod api;
mod components;
mod window;
mod ws;

use std::collections::{HashMap, HashSet};

use dioxus::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::{closure::Closure, JsCast};

use window::{Desktop, Phase, WindowKind};
use ws::ClientFrame;

/// Window minimize/restore animation length, matching the CSS transition.
pub const WINDOW_ANIMATION_MS: u32 = 500;

/// Share of a terminal section that must be on screen to start its typing.
const SECTION_VISIBLE_RATIO: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Project {
    pub id: String,
    pub command: String,
    pub info: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FeedItem {
    pub id: u64,
    /// Plain text, rendered as a text node
    pub question: String,
    /// Markup frame for the reply area
    #[serde(rename = "content")]
    pub reply: String,
    pub preset: bool,
}

/// All page state touched by session events.
#[derive(Clone, Copy)]
pub struct Page {
    pub feed: Signal<Vec<FeedItem>>,
    pub typed: Signal<HashMap<usize, String>>,
    pub info_shown: Signal<HashSet<usize>>,
    pub input_enabled: Signal<bool>,
    pub end_message: Signal<bool>,
}

impl Page {
    fn apply(mut self, event: &Value) {
        let data = event.get("data");
        match event.get("event").and_then(|v| v.as_str()) {
            Some("message") => {
                if let Some(item) = data.and_then(|d| serde_json::from_value(d.clone()).ok()) {
                    self.feed.push(item);
                }
            }
            Some("reveal") => {
                let (Some(area), Some(content)) = (
                    data.and_then(|d| d.get("area")).and_then(|v| v.as_str()),
                    data.and_then(|d| d.get("content")).and_then(|v| v.as_str()),
                ) else {
                    return;
                };
                if let Some(id) = area.strip_prefix("chat:").and_then(|s| s.parse::<u64>().ok()) {
                    if let Some(item) = self.feed.write().iter_mut().find(|m| m.id == id) {
                        item.reply = content.to_string();
                    }
                } else if let Some(i) = area
                    .strip_prefix("terminal:")
                    .and_then(|s| s.parse::<usize>().ok())
                {
                    self.typed.write().insert(i, content.to_string());
                }
            }
            Some("scroll") => {
                let smooth = data
                    .and_then(|d| d.get("behavior"))
                    .and_then(|v| v.as_str())
                    == Some("smooth");
                scroll_to_bottom("chat-feed", smooth);
            }
            Some("input_gate") => {
                if let Some(enabled) = data.and_then(|d| d.get("enabled")).and_then(|v| v.as_bool()) {
                    self.input_enabled.set(enabled);
                }
            }
            Some("end_dismissed") => self.end_message.set(false),
            Some("cleared") => {
                let ids: Vec<u64> = data
                    .and_then(|d| d.get("ids"))
                    .and_then(|v| serde_json::from_value(v.clone()).ok())
                    .unwrap_or_default();
                self.feed.write().retain(|m| !ids.contains(&m.id));
            }
            Some("project_info") => {
                let section = data.and_then(|d| d.get("section")).and_then(|v| v.as_u64());
                let visible = data.and_then(|d| d.get("visible")).and_then(|v| v.as_bool());
                if let (Some(i), Some(true)) = (section, visible) {
                    self.info_shown.write().insert(i as usize);
                }
            }
            _ => {}
        }
    }
}

fn element(id: &str) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

fn scroll_to_bottom(id: &str, smooth: bool) {
    let Some(el) = element(id) else {
        return;
    };
    if smooth {
        let opts = web_sys::ScrollToOptions::new();
        opts.set_top(el.scroll_height() as f64);
        opts.set_behavior(web_sys::ScrollBehavior::Smooth);
        el.scroll_to_with_scroll_to_options(&opts);
    } else {
        el.set_scroll_top(el.scroll_height());
    }
}

fn viewport() -> (f64, f64) {
    let Some(w) = web_sys::window() else {
        return (1280.0, 800.0);
    };
    let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1280.0);
    let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    (width, height)
}

/// Sections at least partly scrolled into the terminal body.
pub fn sections_in_view(count: usize) -> Vec<usize> {
    let Some(body) = element("terminal-body") else {
        return Vec::new();
    };
    let view = body.get_bounding_client_rect();
    (0..count)
        .filter(|i| {
            let Some(el) = element(&format!("section-{}", i)) else {
                return false;
            };
            let r = el.get_bounding_client_rect();
            let overlap = r.bottom().min(view.bottom()) - r.top().max(view.top());
            r.height() > 0.0 && overlap >= r.height() * SECTION_VISIBLE_RATIO
        })
        .collect()
}

/// Move a window through an animated phase, finishing it after the CSS
/// transition.
pub fn animate(mut desktop: Signal<Desktop>, kind: WindowKind) {
    let phase = desktop.read().phase(kind);
    let started = match phase {
        Phase::Normal => desktop.write().minimize(kind),
        Phase::Minimized => desktop.write().restore(kind),
        _ => false,
    };
    if !started {
        return;
    }
    spawn(async move {
        gloo_timers::future::TimeoutFuture::new(WINDOW_ANIMATION_MS).await;
        let mut d = desktop.write();
        if !d.finish_minimize(kind) {
            d.finish_restore(kind);
        }
    });
}

fn main() {
    dioxus::launch(App);
}

fn App() -> Element {
    let page = Page {
        feed: use_signal(Vec::new),
        typed: use_signal(HashMap::new),
        info_shown: use_signal(HashSet::new),
        input_enabled: use_signal(|| true),
        end_message: use_signal(|| true),
    };
    let mut projects = use_signal(Vec::<Project>::new);
    let mut requested = use_signal(HashSet::<usize>::new);
    let mut desktop = use_signal(|| {
        let (w, h) = viewport();
        Desktop::new(w, h)
    });

    // One chat session for the page's lifetime
    let session = use_coroutine(move |rx: UnboundedReceiver<ClientFrame>| async move {
        ws::run_session(rx, move |event| page.apply(&event)).await;
    });

    // Fetch projects on mount, keep windows inside the viewport on resize
    use_effect(move || {
        spawn(async move {
            match api::fetch_projects().await {
                Ok(list) => projects.set(list),
                Err(e) => tracing::warn!("Failed to load projects: {}", e),
            }
        });

        let on_resize = Closure::<dyn FnMut()>::new(move || {
            let (w, h) = viewport();
            desktop.write().resize(w, h);
        });
        if let Some(w) = web_sys::window() {
            let _ = w.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
        }
        on_resize.forget();
    });

    let mut check_sections = move || {
        for i in sections_in_view(projects.read().len()) {
            if requested.write().insert(i) {
                session.send(ClientFrame::Section { index: i });
            }
        }
    };

    // Re-check once projects have rendered
    use_effect(move || {
        if !projects.read().is_empty() {
            check_sections();
        }
    });

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }
        div {
            id: "desktop",
            onmousemove: move |e| {
                let p = e.client_coordinates();
                desktop.write().drag_to(p.x, p.y);
            },
            onmouseup: move |_| desktop.write().end_drag(),

            components::window_frame::WindowFrame {
                kind: WindowKind::Terminal,
                desktop,
                components::terminal::Terminal {
                    projects: projects(),
                    typed: page.typed.read().clone(),
                    info_shown: page.info_shown.read().clone(),
                    on_scroll: move |_| check_sections(),
                }
            }

            components::window_frame::WindowFrame {
                kind: WindowKind::Chat,
                desktop,
                components::chat_feed::ChatFeed {
                    items: page.feed.read().clone(),
                    end_message: (page.end_message)(),
                }
                components::input_bar::InputBar {
                    enabled: (page.input_enabled)(),
                    on_send: move |text: String| session.send(ClientFrame::Ask { text }),
                    on_clear: move |_| session.send(ClientFrame::Clear),
                }
            }

            components::dock::Dock { desktop }
        }
    }
}
