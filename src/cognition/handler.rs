//! HTTP handler for the Trace API
//!
//! - GET /traces/:id  recorded steps of one trace plus chain verification

use crate::api::{error_response, json_response};
use crate::cognition::trace::{verify_chain, TraceLog, TraceStep};
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for trace handlers
#[derive(Clone)]
pub struct TracesState {
    pub traces: Arc<TraceLog>,
}

/// Response body for `GET /traces/:id`
#[derive(Debug, Serialize)]
pub struct TraceResponse {
    pub trace_id: String,
    pub steps: Vec<TraceStep>,
    pub verified: bool,
}

/// Create the traces router
pub fn traces_router(state: TracesState) -> Router {
    Router::new()
        .route("/traces/:id", get(get_trace))
        .with_state(state)
}

/// GET /traces/:id
async fn get_trace(
    State(state): State<TracesState>,
    Path(trace_id): Path<String>,
) -> impl IntoResponse {
    match state.traces.steps(&trace_id).await {
        Some(steps) => {
            let verified = verify_chain(&steps);
            if !verified {
                tracing::warn!(trace_id = %trace_id, "Trace failed hash verification");
            }
            json_response(
                StatusCode::OK,
                &TraceResponse {
                    trace_id,
                    steps,
                    verified,
                },
            )
        }
        None => error_response(&Error::NotFound(format!("Trace {} not found", trace_id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::trace::StepDraft;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_get_trace() {
        let traces = Arc::new(TraceLog::new());
        traces
            .commit(
                "t-1",
                vec![
                    StepDraft::new("M1", "PERCEPT", serde_json::json!({"len": 3})),
                    StepDraft::new("M2", "STORE", serde_json::json!({"status": "ignored"})),
                ],
            )
            .await
            .unwrap();

        let app = traces_router(TracesState { traces });
        let resp = app.oneshot(get_uri("/traces/t-1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["trace_id"], "t-1");
        assert_eq!(json["verified"], true);
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert!(steps[0]["prev_hash"].is_null());
        assert_eq!(steps[1]["prev_hash"], steps[0]["hash"]);
    }

    #[tokio::test]
    async fn test_get_unknown_trace() {
        let app = traces_router(TracesState {
            traces: Arc::new(TraceLog::new()),
        });
        let resp = app.oneshot(get_uri("/traces/missing")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}
