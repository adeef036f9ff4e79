//! HTTP handlers for the Memory API
//!
//! - GET  /memory?type=episodic|semantic[&id=...]  list or fetch items
//! - POST /memory                                   store a new item

use crate::api::{error_response, json_response};
use crate::error::{Error, Result};
use crate::memory::store::MemoryStore;
use crate::memory::types::*;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Shared state for memory handlers
#[derive(Clone)]
pub struct MemoryState {
    pub store: Arc<MemoryStore>,
}

/// Create the memory router
pub fn memory_router(state: MemoryState) -> Router {
    Router::new()
        .route("/memory", get(list_memory).post(create_memory))
        .with_state(state)
}

/// GET /memory
async fn list_memory(
    State(state): State<MemoryState>,
    Query(params): Query<MemoryQuery>,
) -> impl IntoResponse {
    match query_items(&state.store, &params).await {
        Ok(items) => json_response(StatusCode::OK, &MemoryItemsResponse { items }),
        Err(e) => error_response(&e),
    }
}

async fn query_items(store: &MemoryStore, params: &MemoryQuery) -> Result<Vec<MemoryItem>> {
    let memory_type: MemoryType = params
        .memory_type
        .as_deref()
        .ok_or_else(|| Error::InvalidType("missing 'type' query parameter".to_string()))?
        .parse()?;
    store.get(memory_type, params.id.as_deref()).await
}

/// POST /memory
async fn create_memory(
    State(state): State<MemoryState>,
    Json(request): Json<CreateMemoryRequest>,
) -> impl IntoResponse {
    match store_item(&state.store, request).await {
        Ok(id) => json_response(StatusCode::CREATED, &CreateMemoryResponse { id }),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected memory item");
            error_response(&e)
        }
    }
}

async fn store_item(store: &MemoryStore, request: CreateMemoryRequest) -> Result<String> {
    let tag = request.type_tag()?.to_string();
    store.put_tagged(&tag, request.data).await
}
