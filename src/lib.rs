//! TITANS Workspace - memory, knowledge graph and chat routing
//!
//! A small HTTP gateway in front of the TITANS cognitive architecture.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       TITANS Gateway                          │
//! │                                                               │
//! │   POST /chat ──► Chat Router ──┬──► titans agent (M1..M5)     │
//! │                                │        │                     │
//! │                                │        ├──► Trace log        │
//! │                                │        └──► Memory Store     │
//! │                                └──► HTTP proxy agents         │
//! │                                                               │
//! │   GET/POST /memory ──► Memory Store (episodic | semantic)     │
//! │   GET /graph ──────► Knowledge Graph Reader ──► Memory Store  │
//! │   GET /traces/:id ─► Trace log                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: Unified router, error bodies, CORS
//! - [`chat`]: Agent dispatch to the local pipeline or remote proxies
//! - [`cognition`]: The TITANS pipeline and its hash-chained trace
//! - [`config`]: Configuration management
//! - [`gateway`]: Server lifecycle
//! - [`graph`]: Read-only knowledge graph over memory
//! - [`memory`]: Episodic/semantic memory store

pub mod api;
pub mod chat;
pub mod cognition;
pub mod config;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod memory;

pub use error::{Error, Result};
