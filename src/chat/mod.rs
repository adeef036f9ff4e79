//! Chat routing
//!
//! `POST /chat` dispatches to the local `titans` agent or to an external
//! HTTP proxy configured under `[agents.proxies.<name>]`.

pub mod backend;
pub mod handler;
pub mod proxy;
pub mod router;
pub mod types;

pub use backend::{AgentTarget, ChatBackend, LOCAL_AGENT};
pub use handler::{chat_router, ChatState};
pub use proxy::ProxyBackend;
pub use router::ChatRouter;
pub use types::{ChatReply, ChatRequest};
