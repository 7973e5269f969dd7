//! Window chrome — draggable header with a minimize control.

use dioxus::prelude::*;

use crate::window::{Desktop, WindowKind};

#[derive(Clone, PartialEq, Props)]
pub struct WindowFrameProps {
    kind: WindowKind,
    desktop: Signal<Desktop>,
    children: Element,
}

pub fn WindowFrame(props: WindowFrameProps) -> Element {
    let kind = props.kind;
    let mut desktop = props.desktop;
    let d = desktop.read();
    let style = d.style(kind);
    let phase = d.phase(kind).class();
    drop(d);
    let (id, title) = (kind.id(), kind.title());

    rsx! {
        div {
            id: "{id}-window",
            class: "window {id} {phase}",
            style: "{style}",
            onmousedown: move |_| desktop.write().raise(kind),

            div {
                class: "window-header",
                onmousedown: move |e| {
                    let p = e.client_coordinates();
                    desktop.write().begin_drag(kind, p.x, p.y);
                },
                span { class: "window-title", "{title}" }
                button {
                    class: "window-minimize",
                    // Controls never start a drag
                    onmousedown: move |e| e.stop_propagation(),
                    onclick: move |_| crate::animate(desktop, kind),
                    "_"
                }
            }
            div { class: "window-body", {props.children} }
        }
    }
}
