//! folio-core — Pure domain logic, no UI.
//!
//! Holds the FAQ knowledge base, the keyword matcher, the markup-aware
//! typing revealer, the window manager and the chat session that ties them
//! together. Frontends (TUI, Web) drive a session through commands and
//! subscribe to its events via tokio::broadcast.

pub mod config;
pub mod events;
pub mod knowledge;
pub mod markup;
pub mod matcher;
pub mod reveal;
pub mod session;
pub mod showcase;
pub mod types;
pub mod window;
