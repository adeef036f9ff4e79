//! HTTP handler for the Graph API
//!
//! - GET /graph  current nodes/edges snapshot

use crate::graph::reader::KnowledgeGraphReader;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

/// Shared state for graph handlers
#[derive(Clone)]
pub struct GraphState {
    pub reader: Arc<KnowledgeGraphReader>,
}

/// Create the graph router
pub fn graph_router(state: GraphState) -> Router {
    Router::new()
        .route("/graph", get(get_graph))
        .with_state(state)
}

/// GET /graph
async fn get_graph(State(state): State<GraphState>) -> impl IntoResponse {
    Json(state.reader.get_graph().await)
}
