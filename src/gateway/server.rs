//! Gateway server implementation

use crate::api::{build_app, AppState};
use crate::chat::ChatRouter;
use crate::cognition::{TitansAgent, TraceLog};
use crate::config::TitansConfig;
use crate::error::{Error, Result};
use crate::graph::KnowledgeGraphReader;
use crate::memory::MemoryStore;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Notify, RwLock};

/// Gateway server state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GatewayState {
    /// Not serving
    Stopped,
    /// Binding the listener
    Starting,
    /// Serving requests
    Running,
    /// Draining in-flight requests
    ShuttingDown,
}

/// TITANS workspace gateway
pub struct Gateway {
    config: TitansConfig,
    state: Arc<RwLock<GatewayState>>,
    app_state: AppState,
    shutdown: Arc<Notify>,
}

impl Gateway {
    /// Create a gateway, opening persistent stores when configured
    pub async fn new(config: TitansConfig) -> Result<Self> {
        let memory = if config.memory.persist {
            Arc::new(MemoryStore::open(config.memory.dir.clone()).await?)
        } else {
            Arc::new(MemoryStore::new())
        };
        let traces = if config.trace.persist {
            Arc::new(TraceLog::open(config.trace.dir.clone()).await?)
        } else {
            Arc::new(TraceLog::new())
        };

        let agent = TitansAgent::new(config.agents.titans.clone(), memory.clone(), traces.clone());
        let chat = ChatRouter::with_proxies(Arc::new(agent), &config.agents.proxies)?;

        let app_state = AppState {
            graph: Arc::new(KnowledgeGraphReader::new(memory.clone())),
            chat: Arc::new(chat),
            memory,
            traces,
        };

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(GatewayState::Stopped)),
            app_state,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Get current state
    pub async fn state(&self) -> GatewayState {
        *self.state.read().await
    }

    /// Get the configuration
    pub fn config(&self) -> &TitansConfig {
        &self.config
    }

    /// Shared stores and routers
    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// Build the HTTP application
    pub fn router(&self) -> Router {
        build_app(self.app_state.clone(), &self.config.gateway.cors_origins)
    }

    /// Bind the configured host and port
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);
        TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Gateway(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Bind and serve until `stop` is called
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until `stop` is called
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut state = self.state.write().await;
        if *state != GatewayState::Stopped {
            return Err(Error::Gateway("Gateway already running".to_string()));
        }
        *state = GatewayState::Starting;
        drop(state);

        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                *self.state.write().await = GatewayState::Stopped;
                return Err(e.into());
            }
        };
        let app = self.router();
        let shutdown = self.shutdown.clone();

        {
            // A stop() during startup already moved us to ShuttingDown
            let mut state = self.state.write().await;
            if *state == GatewayState::Starting {
                *state = GatewayState::Running;
            }
        }
        tracing::info!("TITANS gateway listening on {}", addr);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await;

        *self.state.write().await = GatewayState::Stopped;
        tracing::info!("TITANS gateway stopped");
        result.map_err(|e| Error::Gateway(format!("Server error: {}", e)))
    }

    /// Request a graceful shutdown
    ///
    /// A request made while still starting is kept and takes effect as
    /// soon as the server begins serving.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if !matches!(*state, GatewayState::Starting | GatewayState::Running) {
            return;
        }
        *state = GatewayState::ShuttingDown;
        drop(state);

        tracing::info!("Stopping TITANS gateway");
        self.shutdown.notify_one();
    }

    /// Get gateway status information
    pub async fn status(&self) -> GatewayStatus {
        GatewayStatus {
            state: self.state().await,
            memory_items: self.app_state.memory.len().await,
            proxies: self.app_state.chat.agents(),
            memory_persisted: self.config.memory.persist,
            trace_persisted: self.config.trace.persist,
        }
    }
}

/// Gateway status information
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub state: GatewayState,
    pub memory_items: usize,
    /// Configured proxy agent names
    pub proxies: Vec<String>,
    pub memory_persisted: bool,
    pub trace_persisted: bool,
}

/// Builder for Gateway
pub struct GatewayBuilder {
    config: TitansConfig,
}

impl GatewayBuilder {
    /// Create a new builder with default config
    pub fn new() -> Self {
        Self {
            config: TitansConfig::default(),
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: TitansConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the gateway host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.gateway.host = host.into();
        self
    }

    /// Set the gateway port
    pub fn port(mut self, port: u16) -> Self {
        self.config.gateway.port = port;
        self
    }

    /// Build the gateway
    pub async fn build(self) -> Result<Gateway> {
        Gateway::new(self.config).await
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
