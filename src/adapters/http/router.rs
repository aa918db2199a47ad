use crate::mcp::McpServer;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

/// Path JSON-RPC messages are posted to
pub const MCP_PATH: &str = "/mcp";

/// Build the HTTP router: `POST /mcp` for JSON-RPC, `GET /health` for liveness
pub fn build_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_mcp))
        .route("/health", get(health))
        .with_state(server)
}

async fn handle_mcp(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        // Notifications get no JSON-RPC response
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
