//! HTTP handler for the Chat API
//!
//! - POST /chat  route a message to the named agent

use crate::api::{error_response, json_response};
use crate::chat::router::ChatRouter;
use crate::chat::types::ChatRequest;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use std::sync::Arc;

/// Shared state for chat handlers
#[derive(Clone)]
pub struct ChatState {
    pub router: Arc<ChatRouter>,
}

/// Create the chat router
pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(state)
}

/// POST /chat
async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.router.route(&request).await {
        Ok(reply) => json_response(StatusCode::OK, &reply),
        Err(e) => error_response(&e),
    }
}
