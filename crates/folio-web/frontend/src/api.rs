//! HTTP fetch calls to the Axum backend.

use gloo_net::http::Request;

use crate::Project;

pub async fn fetch_projects() -> Result<Vec<Project>, String> {
    let resp = Request::get("/api/projects")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    resp.json().await.map_err(|e| e.to_string())
}
