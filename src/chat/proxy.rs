//! External chat proxy backend
//!
//! Forwards the chat request unchanged as a JSON POST and expects a
//! `ChatReply` body back. No retries: any transport failure, timeout,
//! non-2xx status or undecodable body is a routing error.

use super::backend::ChatBackend;
use super::types::{ChatReply, ChatRequest};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Chat backend that proxies to a remote HTTP endpoint
pub struct ProxyBackend {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl ProxyBackend {
    pub fn new(name: impl Into<String>, config: &ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            name: name.into(),
            url: config.url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for ProxyBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "unreachable" };
                Error::Routing(format!("Agent '{}' {}: {}", self.name, reason, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Routing(format!(
                "Agent '{}' returned HTTP {}",
                self.name, status
            )));
        }

        response.json::<ChatReply>().await.map_err(|e| {
            Error::Routing(format!("Agent '{}' sent an invalid reply: {}", self.name, e))
        })
    }
}
