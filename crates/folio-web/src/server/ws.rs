//! WebSocket — one chat session per connection. Session events stream to
//! the client; client frames become session commands.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use folio_core::session::{ChatSession, SessionCommand};

use super::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_handler))
}

/// Frames a client may send.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientCommand {
    Ask { text: String },
    Clear,
    /// A showcase section scrolled into view
    Section { index: usize },
}

impl From<ClientCommand> for SessionCommand {
    fn from(cmd: ClientCommand) -> Self {
        match cmd {
            ClientCommand::Ask { text } => SessionCommand::Ask(text),
            ClientCommand::Clear => SessionCommand::Clear,
            ClientCommand::Section { index } => SessionCommand::RevealSection(index),
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    let mut session = ChatSession::new(Arc::clone(&state.site), state.config.clone());
    let mut rx = session.subscribe();
    let command_tx = session.command_sender();
    let session_task = tokio::spawn(async move { session.run().await });

    info!("WebSocket client connected, session {}", session_id);

    loop {
        tokio::select! {
            // Session events -> client
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if socket.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("Failed to serialize event: {}", e);
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Session {} lagged {} events", session_id, n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            // Client frames -> session
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientCommand>(text.as_str()) {
                            Ok(cmd) => {
                                debug!("Session {}: {:?}", session_id, cmd);
                                if command_tx.send(cmd.into()).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Session {}: ignoring bad frame: {}", session_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary
                }
            }
        }
    }

    let _ = command_tx.send(SessionCommand::Stop).await;
    let _ = session_task.await;
    info!("WebSocket client disconnected, session {}", session_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"type":"ask","text":"price?"}"#).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Ask {
                text: "price?".into()
            }
        );
        assert!(matches!(SessionCommand::from(cmd), SessionCommand::Ask(t) if t == "price?"));
    }

    #[test]
    fn test_parse_clear_and_section() {
        let clear: ClientCommand = serde_json::from_str(r#"{"type":"clear"}"#).unwrap();
        assert_eq!(clear, ClientCommand::Clear);
        let section: ClientCommand =
            serde_json::from_str(r#"{"type":"section","index":2}"#).unwrap();
        assert!(matches!(
            SessionCommand::from(section),
            SessionCommand::RevealSection(2)
        ));
    }

    #[test]
    fn test_unknown_frame_rejected() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"stop"}"#).is_err());
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"ask"}"#).is_err());
    }
}
