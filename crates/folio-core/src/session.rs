//! The chat session — answers questions, types replies out and drives the
//! showcase terminal. Runs as an independent tokio task per visitor.
//!
//! All session state is mutated on the session task. Delays and reveals run
//! on their own tasks and report back through an internal wake-up channel,
//! so a late timer for a message that was cleared finds nothing to do.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::events::*;
use crate::knowledge::Site;
use crate::reveal::{OutputArea, RevealProfile, Revealer};
use crate::showcase::Showcase;
use crate::types::*;

/// Shown in a reply area until the reply starts typing.
pub const THINKING_INDICATOR: &str = "<p class=\"typing-indicator\">Thinking...</p>";

/// Messages that can be sent TO the session (from API/TUI)
#[derive(Debug)]
pub enum SessionCommand {
    Ask(String),
    /// A showcase section scrolled into view
    RevealSection(usize),
    Clear,
    Stop,
}

/// Timer and reveal completions reported back to the session task.
#[derive(Debug)]
enum Wake {
    Think(MessageId),
    Type(MessageId),
    Typed(MessageId),
    Reenable(MessageId),
    TypeCommand(usize),
    CommandTyped(usize),
    ShowInfo(usize),
}

/// An output area that publishes every write as a SiteEvent.
#[derive(Clone)]
pub struct BroadcastArea {
    area: String,
    tx: broadcast::Sender<SiteEvent>,
}

impl BroadcastArea {
    pub fn new(area: String, tx: broadcast::Sender<SiteEvent>) -> Self {
        Self { area, tx }
    }
}

impl OutputArea for BroadcastArea {
    fn write(&self, content: &str) {
        let _ = self.tx.send(SiteEvent::Reveal(RevealData {
            area: self.area.clone(),
            content: content.to_string(),
        }));
    }

    fn scroll_to_bottom(&self, behavior: ScrollBehavior) {
        let _ = self.tx.send(SiteEvent::Scroll(ScrollData {
            area: self.area.clone(),
            behavior,
        }));
    }
}

pub struct ChatSession {
    site: Arc<Site>,
    config: Config,
    showcase: Showcase,
    messages: Vec<ChatMessage>,
    /// Responses chosen for messages whose reply has not finished typing
    pending: HashMap<MessageId, String>,
    /// The message whose reply currently holds the input gate closed
    in_flight: Option<MessageId>,
    first_question_asked: bool,
    next_id: MessageId,
    revealer: Revealer,

    pub event_tx: broadcast::Sender<SiteEvent>,
    pub command_tx: mpsc::Sender<SessionCommand>,
    command_rx: Option<mpsc::Receiver<SessionCommand>>,
    wake_tx: mpsc::UnboundedSender<Wake>,
    wake_rx: Option<mpsc::UnboundedReceiver<Wake>>,
}

impl ChatSession {
    pub fn new(site: Arc<Site>, config: Config) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(32);
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let showcase = Showcase::new(site.knowledge.projects.clone());

        Self {
            site,
            config,
            showcase,
            messages: Vec::new(),
            pending: HashMap::new(),
            in_flight: None,
            first_question_asked: false,
            next_id: 0,
            revealer: Revealer::new(),
            event_tx,
            command_tx,
            command_rx: Some(command_rx),
            wake_tx,
            wake_rx: Some(wake_rx),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.event_tx.subscribe()
    }

    pub fn command_sender(&self) -> mpsc::Sender<SessionCommand> {
        self.command_tx.clone()
    }

    pub fn input_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    fn broadcast(&self, event: SiteEvent) {
        let _ = self.event_tx.send(event);
    }

    fn area(&self, area: String) -> BroadcastArea {
        BroadcastArea::new(area, self.event_tx.clone())
    }

    /// Fire-and-forget timer that wakes the session after `delay`.
    fn schedule(&self, delay: Duration, wake: Wake) {
        let tx = self.wake_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(wake);
        });
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Main loop. Subscribe before calling this to see the preset messages.
    pub async fn run(&mut self) {
        let (Some(mut command_rx), Some(mut wake_rx)) = (self.command_rx.take(), self.wake_rx.take())
        else {
            warn!("Session is already running");
            return;
        };

        info!(
            "Session started ({} topics, {} projects)",
            self.site.knowledge.topics.len(),
            self.showcase.sections().len()
        );
        self.publish_presets();
        self.publish_showcase();

        loop {
            tokio::select! {
                cmd = command_rx.recv() => match cmd {
                    Some(SessionCommand::Stop) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(wake) = wake_rx.recv() => self.handle_wake(wake),
            }
        }

        self.revealer.cancel_all();
        info!("Session stopped after {} messages", self.messages.len());
    }

    fn publish_presets(&mut self) {
        let site = Arc::clone(&self.site);
        for question in &site.knowledge.presets {
            let id = self.allocate_id();
            let response = site.matcher.respond(question).to_string();
            let message = ChatMessage {
                id,
                question: question.clone(),
                response: Some(response.clone()),
                asked_at: chrono::Utc::now().to_rfc3339(),
                preset: true,
            };
            self.broadcast(SiteEvent::Message(message_data(&message, response)));
            self.messages.push(message);
        }
    }

    fn publish_showcase(&self) {
        for (i, s) in self.showcase.sections().iter().enumerate() {
            if s.info_visible {
                self.broadcast(SiteEvent::ProjectInfo(ProjectInfoData {
                    section: i,
                    visible: true,
                }));
            }
        }
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Ask(text) => self.ask(&text),
            SessionCommand::RevealSection(index) => self.reveal_section(index),
            SessionCommand::Clear => self.clear(),
            SessionCommand::Stop => {}
        }
    }

    fn ask(&mut self, text: &str) {
        let question = text.trim();
        if question.is_empty() {
            return;
        }
        if let Some(busy) = self.in_flight {
            warn!("Ignoring question while reply {} is in flight", busy);
            return;
        }

        if !self.first_question_asked {
            self.first_question_asked = true;
            self.broadcast(SiteEvent::EndMessageDismissed);
        }

        let id = self.allocate_id();
        self.in_flight = Some(id);
        self.broadcast(SiteEvent::InputGate(InputGateData { enabled: false }));

        let response = self.site.matcher.respond(question).to_string();
        let message = ChatMessage {
            id,
            question: question.to_string(),
            response: None,
            asked_at: chrono::Utc::now().to_rfc3339(),
            preset: false,
        };
        info!("Question {}: {}", id, truncate(question, 80));
        self.broadcast(SiteEvent::Message(message_data(
            &message,
            THINKING_INDICATOR.to_string(),
        )));
        self.messages.push(message);
        self.pending.insert(id, response);

        self.schedule(self.config.send_delay(), Wake::Think(id));
    }

    fn clear(&mut self) {
        let removed: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|m| !m.preset)
            .map(|m| m.id)
            .collect();
        self.messages.retain(|m| m.preset);
        for id in &removed {
            self.revealer.cancel(&chat_area(*id));
            self.pending.remove(id);
        }
        info!("Cleared {} messages", removed.len());
        self.broadcast(SiteEvent::Cleared(ClearedData { ids: removed }));

        if self.in_flight.take().is_some() {
            self.broadcast(SiteEvent::InputGate(InputGateData { enabled: true }));
        }
    }

    fn reveal_section(&mut self, index: usize) {
        if !self.showcase.mark_visible(index) {
            return;
        }
        debug!("Showcase section {} in view", index);
        self.area(terminal_area(index)).write("");
        self.schedule(self.config.command_start_delay(), Wake::TypeCommand(index));
    }

    fn handle_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Think(id) => {
                if !self.pending.contains_key(&id) {
                    return;
                }
                self.area(chat_area(id)).write(THINKING_INDICATOR);
                self.schedule(self.config.thinking_delay(), Wake::Type(id));
            }
            Wake::Type(id) => {
                let Some(response) = self.pending.get(&id).cloned() else {
                    return;
                };
                let area_id = chat_area(id);
                let area = self.area(area_id.clone());
                area.write("");
                let tx = self.wake_tx.clone();
                self.revealer.start(
                    &area_id,
                    area,
                    response,
                    RevealProfile::chat(&self.config),
                    move || {
                        let _ = tx.send(Wake::Typed(id));
                    },
                );
            }
            Wake::Typed(id) => {
                let Some(response) = self.pending.remove(&id) else {
                    return;
                };
                if let Some(m) = self.messages.iter_mut().find(|m| m.id == id) {
                    m.response = Some(response);
                }
                self.schedule(self.config.reenable_delay(), Wake::Reenable(id));
            }
            Wake::Reenable(id) => {
                if self.in_flight == Some(id) {
                    self.in_flight = None;
                    self.broadcast(SiteEvent::InputGate(InputGateData { enabled: true }));
                }
            }
            Wake::TypeCommand(index) => {
                let Some(command) = self.showcase.get(index).map(|s| s.section.command.clone())
                else {
                    return;
                };
                let area_id = terminal_area(index);
                let area = self.area(area_id.clone());
                let tx = self.wake_tx.clone();
                self.revealer.start(
                    &area_id,
                    area,
                    command,
                    RevealProfile::command(&self.config),
                    move || {
                        let _ = tx.send(Wake::CommandTyped(index));
                    },
                );
            }
            Wake::CommandTyped(index) => {
                self.schedule(self.config.project_info_delay(), Wake::ShowInfo(index));
            }
            Wake::ShowInfo(index) => {
                if self.showcase.show_info(index) {
                    self.broadcast(SiteEvent::ProjectInfo(ProjectInfoData {
                        section: index,
                        visible: true,
                    }));
                }
            }
        }
    }
}

fn message_data(message: &ChatMessage, content: String) -> MessageData {
    MessageData {
        id: message.id,
        question: message.question.clone(),
        content,
        preset: message.preset,
        asked_at: message.asked_at.clone(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
