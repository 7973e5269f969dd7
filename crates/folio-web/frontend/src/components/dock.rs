//! Dock — one button per window; restores minimized windows.

use dioxus::prelude::*;

use crate::window::{Desktop, Phase, WindowKind};

#[derive(Clone, PartialEq, Props)]
pub struct DockProps {
    desktop: Signal<Desktop>,
}

pub fn Dock(props: DockProps) -> Element {
    let desktop = props.desktop;

    rsx! {
        div { class: "dock",
            for (kind, id, title) in [WindowKind::Terminal, WindowKind::Chat].map(|k| (k, k.id(), k.title())) {
                button {
                    key: "{id}",
                    class: if desktop.read().phase(kind) == Phase::Minimized { "dock-item minimized" } else { "dock-item" },
                    onclick: move |_| crate::animate(desktop, kind),
                    "{title}"
                }
            }
        }
    }
}
