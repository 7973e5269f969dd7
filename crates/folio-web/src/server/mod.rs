//! Web server — Axum router + shared state.

pub mod api;
pub mod ws;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use folio_core::config::Config;
use folio_core::knowledge::Site;

/// Shared application state. Content is read-only; every WebSocket
/// connection gets its own chat session over it.
pub struct AppState {
    pub site: Arc<Site>,
    pub config: Config,
    pub project_root: PathBuf,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::very_permissive();

    let mut app = Router::new()
        .merge(api::routes())
        .merge(ws::routes())
        .layer(cors)
        .with_state(state.clone());

    // Serve frontend static files if dist directory exists
    let frontend_dist = state.project_root.join("crates/folio-web/frontend/dist");
    if frontend_dist.is_dir() {
        let index_html = frontend_dist.join("index.html");
        app = app.fallback_service(
            ServeDir::new(&frontend_dist).not_found_service(ServeFile::new(index_html)),
        );
    }

    app
}
