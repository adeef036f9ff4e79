//! TITANS gateway configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main TITANS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitansConfig {
    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Chat agent configuration
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Cognitive trace configuration
    #[serde(default)]
    pub trace: TraceConfig,
}

impl TitansConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            cors_origins: Vec::new(),
        }
    }
}

/// Memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Persist memory items as JSON files
    pub persist: bool,

    /// Directory holding `episodic/` and `semantic/` item files
    pub dir: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persist: false,
            dir: default_data_dir().join("memory"),
        }
    }
}

/// Chat agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Local `titans` agent settings
    pub titans: TitansAgentConfig,

    /// External proxy backends keyed by agent name
    pub proxies: BTreeMap<String, ProxyConfig>,
}

/// Local cognitive agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitansAgentConfig {
    /// Surprise (vector norm) above which a percept counts as stored
    pub surprise_threshold: f64,

    /// Write surprising percepts to the memory store as episodic items
    pub record_surprises: bool,

    /// Reasoning knowledge base: concept -> related concepts/actions
    pub knowledge: BTreeMap<String, Vec<String>>,
}

impl Default for TitansAgentConfig {
    fn default() -> Self {
        Self {
            surprise_threshold: 1.0,
            record_surprises: false,
            knowledge: default_knowledge_base(),
        }
    }
}

/// External chat proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Endpoint receiving the chat request as a JSON POST
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_proxy_timeout")]
    pub timeout_secs: u64,
}

fn default_proxy_timeout() -> u64 {
    30
}

/// Cognitive trace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Append every trace step to `<dir>/steps.jsonl`
    pub persist: bool,

    /// Trace log directory
    pub dir: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            persist: false,
            dir: default_data_dir().join("traces"),
        }
    }
}

/// Default knowledge base used by the reasoning stage
pub fn default_knowledge_base() -> BTreeMap<String, Vec<String>> {
    let mut kb = BTreeMap::new();
    kb.insert(
        "CONCEPT_URGENT_TASK".to_string(),
        vec![
            "ACTION_ALLOCATE_RESOURCES".to_string(),
            "NOTIFY_SUPERVISOR".to_string(),
        ],
    );
    kb.insert(
        "CONCEPT_ANALYTICAL_INPUT".to_string(),
        vec!["ACTION_RUN_ANALYSIS".to_string()],
    );
    kb.insert(
        "ACTION_RUN_ANALYSIS".to_string(),
        vec!["SAVE_RESULTS".to_string()],
    );
    kb
}

/// Base data directory (~/.titans/)
pub fn default_data_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".titans")
}
