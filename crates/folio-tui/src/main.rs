//! folio-tui — The portfolio desktop in a terminal.
//! Uses Ratatui + Crossterm for rendering.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, warn};

use folio_core::config::Config;
use folio_core::knowledge::Site;
use folio_core::session::{ChatSession, SessionCommand};
use folio_core::types::Size as ViewSize;

use app::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file, not stdout, since we own the terminal
    let _guard = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(|| -> Box<dyn io::Write> {
            match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("folio-tui.log")
            {
                Ok(file) => Box::new(file),
                Err(_) => Box::new(io::sink()),
            }
        })
        .try_init();

    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match Config::load_from_dir(&project_root) {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default config: {:#}", e);
            Config::default()
        }
    };
    let site = match Site::load(&config) {
        Ok(site) => site,
        Err(e) => {
            warn!("Using built-in content: {:#}", e);
            Site::builtin()
        }
    };
    let projects = site.knowledge.projects.clone();

    let mut session = ChatSession::new(Arc::new(site), config.clone());
    let mut events = session.subscribe();
    let command_tx = session.command_sender();
    let session_task = tokio::spawn(async move { session.run().await });

    // Forward session events into an unbounded channel the draw loop drains
    let (fwd_tx, mut fwd_rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if fwd_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("TUI lagged {} events", n);
                    continue;
                }
                Err(_) => break,
            }
        }
    });

    let (cols, rows) = crossterm::terminal::size()?;
    let viewport = ViewSize {
        width: cols as i32,
        height: rows as i32,
    };
    let mut app = App::new(&config, &projects, viewport, command_tx.clone());
    info!("Starting TUI at {}x{}", cols, rows);

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &mut fwd_rx);

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;

    let _ = command_tx.send(SessionCommand::Stop).await;
    let _ = session_task.await;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<folio_core::events::SiteEvent>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Session events (non-blocking)
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }
        app.tick(Instant::now());
        app.check_sections();

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                Event::Resize(w, h) => app.resize(w, h),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
