//! Chat routing to the local agent or a configured proxy

use super::backend::{AgentTarget, ChatBackend};
use super::proxy::ProxyBackend;
use super::types::{ChatReply, ChatRequest};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Dispatches chat requests by agent name
pub struct ChatRouter {
    local: Arc<dyn ChatBackend>,
    proxies: HashMap<String, Arc<dyn ChatBackend>>,
}

impl ChatRouter {
    /// Create a router with only the local agent
    pub fn new(local: Arc<dyn ChatBackend>) -> Self {
        Self {
            local,
            proxies: HashMap::new(),
        }
    }

    /// Create a router with one HTTP proxy backend per configured entry
    ///
    /// Proxy names are matched the way requests name agents, so an empty
    /// name or one that reads as the local agent is a config error.
    pub fn with_proxies(
        local: Arc<dyn ChatBackend>,
        proxies: &BTreeMap<String, ProxyConfig>,
    ) -> Result<Self> {
        let mut router = Self::new(local);
        for (key, config) in proxies {
            let name = match key.parse::<AgentTarget>() {
                Ok(AgentTarget::Proxy(name)) => name,
                Ok(AgentTarget::Titans) => {
                    return Err(Error::Config(format!(
                        "proxy name '{}' is reserved for the local agent",
                        key
                    )))
                }
                Err(_) => {
                    return Err(Error::Config("proxy name must not be empty".to_string()))
                }
            };
            let backend = ProxyBackend::new(name.clone(), config)?;
            tracing::info!(agent = %name, url = %backend.url(), "Registered chat proxy");
            router.register(name, Arc::new(backend));
        }
        Ok(router)
    }

    /// Register (or replace) a proxy backend
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn ChatBackend>) {
        self.proxies.insert(name.into(), backend);
    }

    /// Configured proxy names, sorted
    pub fn agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.proxies.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve the backend for an agent identifier
    pub fn resolve(&self, agent: &str) -> Result<Arc<dyn ChatBackend>> {
        match agent.parse::<AgentTarget>()? {
            AgentTarget::Titans => Ok(self.local.clone()),
            AgentTarget::Proxy(name) => self
                .proxies
                .get(&name)
                .cloned()
                .ok_or(Error::UnknownAgent(name)),
        }
    }

    /// Route a request and return the backend's reply
    pub async fn route(&self, request: &ChatRequest) -> Result<ChatReply> {
        let backend = self.resolve(&request.agent).map_err(|e| {
            tracing::warn!(agent = %request.agent, "Chat request for unknown agent");
            e
        })?;

        tracing::debug!(agent = %request.agent, backend = backend.name(), "Routing chat request");
        let result = backend.respond(request).await;
        if let Err(e) = &result {
            tracing::warn!(agent = %request.agent, error = %e, "Chat backend failed");
        }
        result
    }
}
