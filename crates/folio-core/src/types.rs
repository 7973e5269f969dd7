//! Core types — Topic, ScoredMatch, ChatMessage, ProjectSection, geometry.

use serde::{Deserialize, Serialize};

// ── Knowledge ──

/// A named FAQ category with trigger keywords and a canned answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    /// Human label listed by the fallback answer
    pub summary: String,
    pub keywords: Vec<String>,
    /// Static markup, never contains user input
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub topic_id: String,
    pub score: u32,
    pub response: String,
}

/// One project shown in the showcase terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub id: String,
    /// Plain text typed after the prompt
    pub command: String,
    /// Markup shown once the command has been typed
    pub info: String,
}

// ── Chat ──

pub type MessageId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Plain text, rendered as text and never as markup
    pub question: String,
    /// Final response markup, set once the reply has fully typed out
    pub response: Option<String>,
    pub asked_at: String,
    /// Preset questions survive a clear
    pub preset: bool,
}

// ── Output areas ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

pub fn chat_area(id: MessageId) -> String {
    format!("chat:{}", id)
}

pub fn terminal_area(section: usize) -> String {
    format!("terminal:{}", section)
}

/// Parse an area id back into its message id, if it is a chat area.
pub fn chat_area_id(area: &str) -> Option<MessageId> {
    area.strip_prefix("chat:").and_then(|s| s.parse().ok())
}

/// Parse an area id back into its section index, if it is a terminal area.
pub fn terminal_area_index(area: &str) -> Option<usize> {
    area.strip_prefix("terminal:").and_then(|s| s.parse().ok())
}

// ── Geometry ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}
