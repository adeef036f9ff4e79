//! Memory item types and wire formats

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of memory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// A discrete event or experience
    Episodic,
    /// A generalized fact or concept
    Semantic,
}

impl MemoryType {
    pub const ALL: [MemoryType; 2] = [MemoryType::Episodic, MemoryType::Semantic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Episodic => "episodic",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episodic" => Ok(Self::Episodic),
            "semantic" => Ok(Self::Semantic),
            other => Err(Error::InvalidType(format!(
                "'{}' (expected 'episodic' or 'semantic')",
                other
            ))),
        }
    }
}

/// A stored memory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /memory`
///
/// The type stays raw JSON so a missing, null, non-string or unknown tag
/// surfaces as `INVALID_TYPE` instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateMemoryRequest {
    #[serde(rename = "type", default)]
    pub memory_type: Option<serde_json::Value>,
    pub data: serde_json::Value,
}

impl CreateMemoryRequest {
    /// The type tag, if it is a JSON string
    pub fn type_tag(&self) -> Result<&str, Error> {
        match &self.memory_type {
            Some(serde_json::Value::String(tag)) => Ok(tag.as_str()),
            Some(other) => Err(Error::InvalidType(format!(
                "'type' must be a string, got {}",
                other
            ))),
            None => Err(Error::InvalidType("missing 'type' field".to_string())),
        }
    }
}

/// Response body for `POST /memory`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMemoryResponse {
    pub id: String,
}

/// Query parameters for `GET /memory`
#[derive(Debug, Deserialize)]
pub struct MemoryQuery {
    #[serde(rename = "type")]
    pub memory_type: Option<String>,
    pub id: Option<String>,
}

/// Response body for `GET /memory`
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryItemsResponse {
    pub items: Vec<MemoryItem>,
}
