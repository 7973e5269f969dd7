//! Chat feed component — questions and their typed replies.

use dioxus::prelude::*;

use crate::FeedItem;

#[derive(Clone, PartialEq, Props)]
pub struct ChatFeedProps {
    items: Vec<FeedItem>,
    end_message: bool,
}

pub fn ChatFeed(props: ChatFeedProps) -> Element {
    rsx! {
        div { id: "chat-feed", class: "messages",
            for item in props.items.iter() {
                div {
                    key: "{item.id}",
                    class: if item.preset { "exchange preset" } else { "exchange" },
                    // Questions are text nodes, never markup
                    div { class: "msg question", "{item.question}" }
                    div {
                        id: "chat-{item.id}",
                        class: "msg reply",
                        dangerous_inner_html: "{item.reply}",
                    }
                }
            }
            if props.end_message {
                div { class: "end-message",
                    "Ask me anything about the app: features, pricing, platforms..."
                }
            }
        }
    }
}
