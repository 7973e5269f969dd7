//! REST API endpoints — topic table, showcase projects and a stateless ask.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/topics", get(get_topics))
        .route("/api/projects", get(get_projects))
        .route("/api/ask", post(post_ask))
}

// --- Topics ---

async fn get_topics(State(state): State<Arc<AppState>>) -> Json<Value> {
    let topics: Vec<Value> = state
        .site
        .knowledge
        .topics
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "summary": t.summary,
                "keywords": t.keywords,
            })
        })
        .collect();
    Json(json!(topics))
}

// --- Projects ---

async fn get_projects(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!(state.site.knowledge.projects))
}

// --- Ask ---

#[derive(Deserialize)]
struct AskBody {
    question: String,
}

/// Match a question without a session: no typing, no input gate.
async fn post_ask(State(state): State<Arc<AppState>>, Json(body): Json<AskBody>) -> Json<Value> {
    let question = body.question.trim();
    if question.is_empty() {
        return Json(json!({"error": "empty question"}));
    }

    let matcher = &state.site.matcher;
    let reply = match matcher.best(question) {
        Some(m) => json!({
            "topic": m.topic_id,
            "score": m.score,
            "body": m.response,
        }),
        None => json!({
            "topic": null,
            "score": 0,
            "body": matcher.fallback(),
        }),
    };
    info!("API ask -> {}", reply["topic"]);
    Json(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::Config;
    use folio_core::knowledge::Site;
    use std::path::PathBuf;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            site: Arc::new(Site::builtin()),
            config: Config::default(),
            project_root: PathBuf::from("."),
        })
    }

    fn ask(question: &str) -> Json<AskBody> {
        Json(AskBody {
            question: question.into(),
        })
    }

    #[tokio::test]
    async fn test_ask_matches_topic() {
        let Json(v) = post_ask(State(state()), ask("Is it FREE?")).await;
        assert_eq!(v["topic"], "pricing");
        assert_eq!(v["score"], 1);
        assert!(v["body"].as_str().unwrap().contains("Pricing"));
    }

    #[tokio::test]
    async fn test_ask_falls_back() {
        let s = state();
        let fallback = s.site.matcher.fallback().to_string();
        let Json(v) = post_ask(State(s), ask("hello there")).await;
        assert!(v["topic"].is_null());
        assert_eq!(v["score"], 0);
        assert_eq!(v["body"], fallback);
    }

    #[tokio::test]
    async fn test_ask_rejects_blank() {
        let Json(v) = post_ask(State(state()), ask("   ")).await;
        assert_eq!(v["error"], "empty question");
    }

    #[tokio::test]
    async fn test_topics_in_table_order() {
        let Json(v) = get_topics(State(state())).await;
        let ids: Vec<&str> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.first(), Some(&"about"));
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_projects_listed() {
        let Json(v) = get_projects(State(state())).await;
        assert_eq!(v[0]["id"], "ezmoney");
        assert!(v[0]["command"].is_string());
    }
}
