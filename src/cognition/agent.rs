//! Local `titans` chat agent
//!
//! Runs a message through M1..M5, commits one trace step per stage and
//! answers with the M5 decision.

use super::stages::{self, MemoryStatus};
use super::trace::{StepDraft, TraceLog, TraceStep};
use crate::chat::{ChatBackend, ChatReply, ChatRequest, LOCAL_AGENT};
use crate::config::TitansAgentConfig;
use crate::error::Result;
use crate::memory::{MemoryStore, MemoryType};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct CognitiveRun {
    pub trace_id: String,
    pub steps: Vec<TraceStep>,
    pub action: stages::Action,
}

/// The in-process cognitive agent
pub struct TitansAgent {
    config: TitansAgentConfig,
    memory: Arc<MemoryStore>,
    traces: Arc<TraceLog>,
}

impl TitansAgent {
    pub fn new(
        config: TitansAgentConfig,
        memory: Arc<MemoryStore>,
        traces: Arc<TraceLog>,
    ) -> Self {
        Self {
            config,
            memory,
            traces,
        }
    }

    pub fn traces(&self) -> &Arc<TraceLog> {
        &self.traces
    }

    /// Run the full pipeline and record its trace
    pub async fn run(
        &self,
        message: &str,
        context: Option<&serde_json::Value>,
    ) -> Result<CognitiveRun> {
        let trace_id = context
            .and_then(|c| c.get("trace_id"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("trace-{}", uuid::Uuid::new_v4()));

        let mut drafts = Vec::with_capacity(5);

        let started = Instant::now();
        let percept = stages::perceive(message, context);
        drafts.push(
            StepDraft::new("M1", "PERCEPT", json!({ "input": message, "percept": percept }))
                .metric("dt_ms", elapsed_ms(started)),
        );

        let started = Instant::now();
        let assessment = stages::assess_surprise(&percept, self.config.surprise_threshold);
        let stored = assessment.status == MemoryStatus::Stored;
        let memory_id = if self.config.record_surprises && stored {
            let id = self
                .memory
                .put(
                    MemoryType::Episodic,
                    json!({
                        "event": "surprise",
                        "message": message,
                        "surprise": assessment.surprise,
                        "vector": percept.vector,
                    }),
                )
                .await;
            Some(id)
        } else {
            None
        };
        drafts.push(
            StepDraft::new(
                "M2",
                "STORE",
                json!({
                    "surprise": assessment.surprise,
                    "status": assessment.status,
                    "memory_id": memory_id,
                }),
            )
            .metric("dt_ms", elapsed_ms(started)),
        );

        let started = Instant::now();
        let abstraction = stages::abstract_percept(&percept);
        drafts.push(
            StepDraft::new("M3", "ABSTRACT", serde_json::to_value(&abstraction)?)
                .metric("dt_ms", elapsed_ms(started)),
        );

        let started = Instant::now();
        let reasoning = stages::reason(&self.config.knowledge, &abstraction);
        drafts.push(
            StepDraft::new("M4", "REASON", serde_json::to_value(&reasoning)?)
                .metric("dt_ms", elapsed_ms(started)),
        );

        let started = Instant::now();
        let action = stages::act(&reasoning, message);
        drafts.push(
            StepDraft::new(
                "M5",
                "ACT",
                json!({
                    "decision": action.decision,
                    "plan": action.plan,
                    "output": action.output,
                }),
            )
            .metric("dt_ms", elapsed_ms(started))
            .metric("delta_uncertainty", action.delta_uncertainty),
        );

        let steps = self.traces.commit(&trace_id, drafts).await?;

        tracing::info!(
            trace_id = %trace_id,
            concept = abstraction.concept,
            surprise = assessment.surprise,
            "Cognitive run complete"
        );

        Ok(CognitiveRun {
            trace_id,
            steps,
            action,
        })
    }
}

#[async_trait]
impl ChatBackend for TitansAgent {
    fn name(&self) -> &str {
        LOCAL_AGENT
    }

    async fn respond(&self, request: &ChatRequest) -> Result<ChatReply> {
        let run = self.run(&request.message, request.context.as_ref()).await?;
        Ok(ChatReply {
            reply: run.action.decision.clone(),
            trace: Some(json!({
                "trace_id": run.trace_id,
                "steps": run.steps,
                "output": run.action.output,
            })),
        })
    }
}

/// The two reference scenarios: an urgent task and a routine analysis
pub fn demo_scenarios() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        (
            "URGENT TASK",
            json!({"feature1": 0.5, "feature2": 0.3, "urgency": 0.9}),
        ),
        (
            "ROUTINE ANALYSIS",
            json!({"feature1": 0.9, "feature2": 0.2, "urgency": 0.1}),
        ),
    ]
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
