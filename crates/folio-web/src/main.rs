//! folio-web — Axum web server entry point.
//! Loads config and site content, then serves the API, the chat WebSocket
//! and the built frontend.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use folio_core::config::Config;
use folio_core::knowledge::Site;

use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

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
    info!(
        "Serving {} topics and {} projects",
        site.knowledge.topics.len(),
        site.knowledge.projects.len()
    );

    let state = Arc::new(AppState {
        site: Arc::new(site),
        config,
        project_root,
    });
    let app = server::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = format!("0.0.0.0:{}", port);

    eprintln!("\n  Open http://localhost:{} to see the site\n", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Graceful shutdown on Ctrl+C; open sockets stop their sessions on drop
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped.");
    Ok(())
}
