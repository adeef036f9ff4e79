//! Unified API router for the TITANS workspace
//!
//! Merges all module routers into a single axum `Router` with CORS,
//! request tracing and a consistent error body.
//!
//! ## Endpoint Map
//!
//! | Route          | Module    | Description                      |
//! |----------------|-----------|----------------------------------|
//! | `/health`      | api       | Liveness check                   |
//! | `/chat`        | chat      | Route a message to an agent      |
//! | `/graph`       | graph     | Knowledge graph snapshot         |
//! | `/memory`      | memory    | Store and query memory items     |
//! | `/traces/:id`  | cognition | Hash-chained cognitive trace     |

use crate::chat::{chat_router, ChatRouter, ChatState};
use crate::cognition::{traces_router, TraceLog, TracesState};
use crate::error::Error;
use crate::graph::{graph_router, GraphState, KnowledgeGraphReader};
use crate::memory::{memory_router, MemoryState, MemoryStore};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Combined application state holding references to all subsystems
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<MemoryStore>,
    pub graph: Arc<KnowledgeGraphReader>,
    pub chat: Arc<ChatRouter>,
    pub traces: Arc<TraceLog>,
}

/// Build the complete HTTP application
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(chat_router(ChatState {
            router: state.chat,
        }))
        .merge(graph_router(GraphState {
            reader: state.graph,
        }))
        .merge(memory_router(MemoryState {
            store: state.memory,
        }))
        .merge(traces_router(TracesState {
            traces: state.traces,
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Response helpers
// =============================================================================

/// API error body: `{"error": {"code", "message"}}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        Self {
            error: ApiErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Map an error to its status and structured body
pub fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }
    let body = serde_json::to_value(ApiError::from(err)).unwrap_or_else(|_| {
        serde_json::json!({"error": {"code": err.code(), "message": "unserializable error"}})
    });
    (status, Json(body))
}

/// Serialize `value` as the response body
pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> (StatusCode, Json<serde_json::Value>) {
    match serde_json::to_value(value) {
        Ok(body) => (status, Json(body)),
        Err(e) => error_response(&Error::Serialization(e)),
    }
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::TitansAgent;
    use crate::config::TitansAgentConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_app() -> Router {
        let memory = Arc::new(MemoryStore::new());
        let traces = Arc::new(TraceLog::new());
        let agent = TitansAgent::new(TitansAgentConfig::default(), memory.clone(), traces.clone());
        build_app(
            AppState {
                graph: Arc::new(KnowledgeGraphReader::new(memory.clone())),
                chat: Arc::new(ChatRouter::new(Arc::new(agent))),
                memory,
                traces,
            },
            &[],
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 256)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = make_app().oneshot(get_uri("/health")).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_memory_feeds_graph() {
        let app = make_app();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/memory",
                serde_json::json!({"type": "semantic", "data": {"concept": "billing"}}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let semantic_id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/memory",
                serde_json::json!({"type": "episodic", "data": {"event": "invoice sent", "concept": "billing"}}),
            ))
            .await
            .unwrap();
        let episodic_id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let resp = app.oneshot(get_uri("/graph")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let graph = body_json(resp).await;
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
        let edges = graph["edges"].as_array().unwrap();
        assert!(edges.iter().any(|e| e["source"] == episodic_id.as_str()
            && e["target"] == semantic_id.as_str()
            && e["relation"] == "instance_of"));
    }

    #[tokio::test]
    async fn test_chat_trace_is_queryable() {
        let app = make_app();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/chat",
                serde_json::json!({
                    "agent": "titans",
                    "message": "run the numbers",
                    "context": {"feature1": 0.9, "feature2": 0.2, "urgency": 0.1, "trace_id": "t-42"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["reply"], "Decision: Execute 'ACTION_RUN_ANALYSIS'.");

        let resp = app.oneshot(get_uri("/traces/t-42")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let trace = body_json(resp).await;
        assert_eq!(trace["verified"], true);
        assert_eq!(trace["steps"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_error_response_body() {
        let (status, Json(body)) = error_response(&Error::InvalidType("working".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_TYPE");
        assert_eq!(body["error"]["message"], "Invalid memory type: working");

        let (status, Json(body)) = error_response(&Error::Routing("down".to_string()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ROUTING_ERROR");

        // The body is exactly the serialized ApiError
        let err = Error::NotFound("mem-1".to_string());
        let (_, Json(body)) = error_response(&err);
        assert_eq!(body, serde_json::to_value(ApiError::from(&err)).unwrap());
        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_eq!(body["error"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_build_cors_empty_origins() {
        let _cors = build_cors(&[]);
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&["http://localhost:1420".to_string()]);
    }
}
