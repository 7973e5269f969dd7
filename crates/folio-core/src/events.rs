//! SiteEvent enum — broadcast from a ChatSession to TUI/Web frontends via tokio::broadcast.

use serde::{Deserialize, Serialize};

use crate::types::{MessageId, ScrollBehavior};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    pub id: MessageId,
    /// Plain text; frontends must not interpret it as markup
    pub question: String,
    /// Markup currently shown in the reply area
    pub content: String,
    pub preset: bool,
    pub asked_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealData {
    pub area: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollData {
    pub area: String,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputGateData {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearedData {
    pub ids: Vec<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfoData {
    pub section: usize,
    pub visible: bool,
}

/// Events broadcast from a session to all subscribers (TUI, WebSocket clients).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SiteEvent {
    /// A question and its reply area were added to the feed
    #[serde(rename = "message")]
    Message(MessageData),

    /// New content for an output area (chat reply or terminal command)
    #[serde(rename = "reveal")]
    Reveal(RevealData),

    /// Scroll an output area's container to the bottom
    #[serde(rename = "scroll")]
    Scroll(ScrollData),

    /// Question input enabled/disabled
    #[serde(rename = "input_gate")]
    InputGate(InputGateData),

    /// The end-of-feed hint went away after the first question
    #[serde(rename = "end_dismissed")]
    EndMessageDismissed,

    /// User-asked messages removed
    #[serde(rename = "cleared")]
    Cleared(ClearedData),

    /// A showcase section's project info changed visibility
    #[serde(rename = "project_info")]
    ProjectInfo(ProjectInfoData),
}

impl SiteEvent {
    /// Serialize to the JSON format the frontend expects:
    /// `{"event": "...", "data": {...}}`
    pub fn to_ws_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
