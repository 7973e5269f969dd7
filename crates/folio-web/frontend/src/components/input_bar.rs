//! Input bar component — question input, send and clear buttons.

use dioxus::prelude::*;

#[derive(Clone, PartialEq, Props)]
pub struct InputBarProps {
    enabled: bool,
    on_send: EventHandler<String>,
    on_clear: EventHandler<()>,
}

pub fn InputBar(props: InputBarProps) -> Element {
    let mut input_text = use_signal(String::new);

    let mut send = move || {
        let text = input_text();
        if !props.enabled || text.trim().is_empty() {
            return;
        }
        input_text.set(String::new());
        props.on_send.call(text);
    };

    rsx! {
        div { class: "input-bar",
            input {
                r#type: "text",
                placeholder: if props.enabled { "Ask a question..." } else { "Thinking..." },
                disabled: !props.enabled,
                value: "{input_text}",
                oninput: move |e| input_text.set(e.value()),
                onkeypress: move |e| {
                    if e.key() == Key::Enter {
                        send();
                    }
                },
            }
            button {
                disabled: !props.enabled,
                onclick: move |_| send(),
                "Send"
            }
            button {
                class: "clear",
                onclick: move |_| props.on_clear.call(()),
                "Clear"
            }
        }
    }
}
