//! Chat backend abstraction and agent target parsing

use super::types::{ChatReply, ChatRequest};
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Name of the local cognitive agent
pub const LOCAL_AGENT: &str = "titans";

/// Resolved dispatch target for a chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTarget {
    /// The in-process TITANS cognitive pipeline
    Titans,
    /// An external proxy, by configured name
    Proxy(String),
}

impl std::str::FromStr for AgentTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(Error::UnknownAgent("agent must not be empty".to_string()));
        }
        if name.eq_ignore_ascii_case(LOCAL_AGENT) {
            Ok(Self::Titans)
        } else {
            Ok(Self::Proxy(name.to_string()))
        }
    }
}

impl std::fmt::Display for AgentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Titans => f.write_str(LOCAL_AGENT),
            Self::Proxy(name) => write!(f, "proxy:{}", name),
        }
    }
}

/// A responder to chat requests, local or remote
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Produce a reply for the request
    async fn respond(&self, request: &ChatRequest) -> Result<ChatReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_agent() {
        assert_eq!("titans".parse::<AgentTarget>().unwrap(), AgentTarget::Titans);
        assert_eq!(" TITANS ".parse::<AgentTarget>().unwrap(), AgentTarget::Titans);
    }

    #[test]
    fn test_parse_proxy_agent() {
        assert_eq!(
            "gpt-4o".parse::<AgentTarget>().unwrap(),
            AgentTarget::Proxy("gpt-4o".to_string())
        );
    }

    #[test]
    fn test_parse_empty_agent() {
        let err = "  ".parse::<AgentTarget>().unwrap_err();
        assert!(matches!(err, Error::UnknownAgent(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(AgentTarget::Titans.to_string(), "titans");
        assert_eq!(AgentTarget::Proxy("gpt".to_string()).to_string(), "proxy:gpt");
    }
}
