//! Knowledge graph: read-only projection over the memory store
//!
//! The graph is derived live from memory contents on every request;
//! nothing is written back.

pub mod handler;
pub mod reader;
pub mod types;

pub use handler::{graph_router, GraphState};
pub use reader::KnowledgeGraphReader;
pub use types::{GraphEdge, GraphNode, GraphSnapshot};
