//! Hash-chained cognitive trace log
//!
//! Every pipeline stage emits one step. A step's hash is the SHA-256 of
//! its canonical JSON (every field except `hash`, encoded byte-for-byte
//! like Python's `json.dumps(..., sort_keys=True)`, see `canonical`), and its
//! `prev_hash` points at the previous step of the same trace, so a trace
//! can be re-verified end to end.
//!
//! When persistence is enabled every committed step is appended as one
//! line to `<dir>/steps.jsonl`.

use super::canonical::to_canonical_vec;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Name of the JSONL step log inside the trace directory
pub const STEP_LOG_FILE: &str = "steps.jsonl";

/// A sealed trace step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Unix timestamp in fractional seconds
    pub ts: f64,
    pub trace_id: String,
    /// Emitting stage (`M1` .. `M5`)
    pub source: String,
    pub event: String,
    pub payload: serde_json::Value,
    pub metrics: BTreeMap<String, f64>,
    pub prev_hash: Option<String>,
    pub hash: String,
}

impl TraceStep {
    /// Recompute the hash from the step contents
    pub fn compute_hash(&self) -> serde_json::Result<String> {
        step_hash(
            self.ts,
            &self.trace_id,
            &self.source,
            &self.event,
            &self.payload,
            &self.metrics,
            self.prev_hash.as_deref(),
        )
    }
}

/// An unsealed step produced by a pipeline stage
#[derive(Debug, Clone)]
pub struct StepDraft {
    pub ts: f64,
    pub source: &'static str,
    pub event: &'static str,
    pub payload: serde_json::Value,
    pub metrics: BTreeMap<String, f64>,
}

impl StepDraft {
    pub fn new(source: &'static str, event: &'static str, payload: serde_json::Value) -> Self {
        Self {
            ts: now_secs(),
            source,
            event,
            payload,
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }
}

fn step_hash(
    ts: f64,
    trace_id: &str,
    source: &str,
    event: &str,
    payload: &serde_json::Value,
    metrics: &BTreeMap<String, f64>,
    prev_hash: Option<&str>,
) -> serde_json::Result<String> {
    let canonical = serde_json::json!({
        "ts": ts,
        "trace_id": trace_id,
        "source": source,
        "event": event,
        "payload": payload,
        "metrics": metrics,
        "prev_hash": prev_hash,
    });
    let bytes = to_canonical_vec(&canonical)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Check hashes and links of one trace's steps
pub fn verify_chain(steps: &[TraceStep]) -> bool {
    let mut prev: Option<&str> = None;
    for step in steps {
        let hash_ok = step.compute_hash().map_or(false, |h| h == step.hash);
        if step.prev_hash.as_deref() != prev || !hash_ok {
            return false;
        }
        prev = Some(&step.hash);
    }
    true
}

/// Per-trace step storage
pub struct TraceLog {
    traces: Arc<RwLock<HashMap<String, Vec<TraceStep>>>>,
    log_path: Option<PathBuf>,
}

impl TraceLog {
    /// Create an in-memory trace log
    pub fn new() -> Self {
        Self {
            traces: Arc::new(RwLock::new(HashMap::new())),
            log_path: None,
        }
    }

    /// Open a persistent trace log in `dir`, replaying existing steps
    pub async fn open(dir: PathBuf) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        let log_path = dir.join(STEP_LOG_FILE);

        let mut traces: HashMap<String, Vec<TraceStep>> = HashMap::new();
        match tokio::fs::read_to_string(&log_path).await {
            Ok(content) => {
                for (lineno, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<TraceStep>(line) {
                        Ok(step) => traces.entry(step.trace_id.clone()).or_default().push(step),
                        Err(e) => {
                            tracing::warn!(
                                "Skipping corrupt trace step at {}:{}: {}",
                                log_path.display(),
                                lineno + 1,
                                e
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        tracing::info!(traces = traces.len(), path = %log_path.display(), "Loaded trace log");

        Ok(Self {
            traces: Arc::new(RwLock::new(traces)),
            log_path: Some(log_path),
        })
    }

    /// Seal drafts onto the end of a trace and record them
    ///
    /// The first draft chains to the latest recorded hash of `trace_id`.
    /// Sealing and recording happen under one write lock, so concurrent
    /// commits to the same trace never fork the chain.
    pub async fn commit(&self, trace_id: &str, drafts: Vec<StepDraft>) -> Result<Vec<TraceStep>> {
        let mut traces = self.traces.write().await;
        let chain = traces.entry(trace_id.to_string()).or_default();

        let mut prev = chain.last().map(|s| s.hash.clone());
        let mut sealed = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let hash = step_hash(
                draft.ts,
                trace_id,
                draft.source,
                draft.event,
                &draft.payload,
                &draft.metrics,
                prev.as_deref(),
            )?;
            let step = TraceStep {
                ts: draft.ts,
                trace_id: trace_id.to_string(),
                source: draft.source.to_string(),
                event: draft.event.to_string(),
                payload: draft.payload,
                metrics: draft.metrics,
                prev_hash: prev.take(),
                hash: hash.clone(),
            };
            prev = Some(hash);
            sealed.push(step);
        }

        if let Some(path) = &self.log_path {
            let mut lines = String::new();
            for step in &sealed {
                lines.push_str(&serde_json::to_string(step)?);
                lines.push('\n');
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(lines.as_bytes()).await?;
            file.flush().await?;
        }

        chain.extend(sealed.iter().cloned());
        tracing::debug!(trace_id, steps = sealed.len(), "Committed trace steps");
        Ok(sealed)
    }

    /// Hash of the last step recorded for a trace
    pub async fn latest_hash(&self, trace_id: &str) -> Option<String> {
        self.traces
            .read()
            .await
            .get(trace_id)
            .and_then(|steps| steps.last())
            .map(|s| s.hash.clone())
    }

    /// All steps of a trace in commit order
    pub async fn steps(&self, trace_id: &str) -> Option<Vec<TraceStep>> {
        self.traces
            .read()
            .await
            .get(trace_id)
            .filter(|steps| !steps.is_empty())
            .cloned()
    }

    /// Verify a recorded trace; `None` if the trace is unknown
    pub async fn verify(&self, trace_id: &str) -> Option<bool> {
        self.steps(trace_id).await.map(|steps| verify_chain(&steps))
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
