//! TITANS gateway error types

use axum::http::StatusCode;
use thiserror::Error;

/// TITANS error type
#[derive(Error, Debug)]
pub enum Error {
    /// Memory type tag outside {episodic, semantic}
    #[error("Invalid memory type: {0}")]
    InvalidType(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Agent identifier does not resolve to a backend
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Backend resolved but could not be reached or answered badly
    #[error("Routing error: {0}")]
    Routing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gateway lifecycle error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable error code exposed in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnknownAgent(_) | Self::Routing(_) => "ROUTING_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidType(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::UnknownAgent(_) => StatusCode::NOT_FOUND,
            Self::Routing(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for TITANS operations
pub type Result<T> = std::result::Result<T, Error>;
