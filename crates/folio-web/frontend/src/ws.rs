//! WebSocket client — one chat session per page. Outgoing client frames
//! arrive on a coroutine channel; incoming session events go to a handler.

use dioxus::prelude::UnboundedReceiver;
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::{futures::WebSocket, Message};
use serde::Serialize;
use serde_json::Value;

/// Frames sent to the server.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Ask { text: String },
    Clear,
    Section { index: usize },
}

fn ws_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let protocol = if location.protocol().unwrap_or_default() == "https:" {
        "wss:"
    } else {
        "ws:"
    };
    let host = location
        .host()
        .unwrap_or_else(|_| "localhost:8000".to_string());
    Some(format!("{}//{}/ws", protocol, host))
}

/// Run the session connection until either side closes.
pub async fn run_session<F>(mut frames: UnboundedReceiver<ClientFrame>, mut on_event: F)
where
    F: FnMut(Value) + 'static,
{
    let Some(url) = ws_url() else {
        tracing::error!("No window location for WebSocket");
        return;
    };
    let ws = match WebSocket::open(&url) {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("WebSocket connect failed: {:?}", e);
            return;
        }
    };
    let (mut write, read) = ws.split();
    let mut read = read.fuse();

    loop {
        futures::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(val) = serde_json::from_str::<Value>(&text) {
                        on_event(val);
                    }
                }
                Some(Ok(Message::Bytes(_))) => {}
                Some(Err(_)) | None => break,
            },
            frame = frames.next() => match frame {
                Some(frame) => {
                    let Ok(json) = serde_json::to_string(&frame) else {
                        continue;
                    };
                    if write.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
    tracing::warn!("WebSocket session closed");
}
