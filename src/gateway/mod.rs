//! Gateway server for the TITANS workspace
//!
//! Owns the shared stores, the chat router and the HTTP listener
//! lifecycle.

mod server;

pub use server::{Gateway, GatewayBuilder, GatewayState, GatewayStatus};
