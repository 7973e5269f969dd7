//! Terminal window body — project sections whose commands type out once
//! they scroll into view.

use std::collections::{HashMap, HashSet};

use dioxus::prelude::*;

use crate::Project;

#[derive(Clone, PartialEq, Props)]
pub struct TerminalProps {
    projects: Vec<Project>,
    typed: HashMap<usize, String>,
    info_shown: HashSet<usize>,
    on_scroll: EventHandler<()>,
}

pub fn Terminal(props: TerminalProps) -> Element {
    rsx! {
        div {
            id: "terminal-body",
            class: "terminal",
            onscroll: move |_| props.on_scroll.call(()),
            for (i, project) in props.projects.iter().enumerate() {
                div {
                    key: "{project.id}",
                    id: "section-{i}",
                    class: "terminal-section",
                    div { class: "prompt",
                        span { class: "prompt-sign", "$ " }
                        // Full command until the typing effect takes over
                        span { class: "command",
                            {props.typed.get(&i).cloned().unwrap_or_else(|| project.command.clone())}
                        }
                    }
                    div {
                        class: if props.info_shown.contains(&i) { "project-info visible" } else { "project-info" },
                        dangerous_inner_html: "{project.info}",
                    }
                }
            }
        }
    }
}
