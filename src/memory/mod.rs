//! Memory system: dual-mode episodic/semantic record store
//!
//! Items are append-only: created by `POST /memory`, never updated or
//! deleted, and optionally persisted as one JSON file per item.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{memory_router, MemoryState};
pub use store::MemoryStore;
pub use types::{MemoryItem, MemoryType};
