//! The five TITANS pipeline stages
//!
//! M1 perception, M2 memory, M3 abstraction, M4 reasoning and M5 agency.
//! Stages are pure functions over the previous stage's output; the agent
//! in `agent.rs` wires them together and records trace steps.

use serde::Serialize;
use std::collections::BTreeMap;

pub const CONCEPT_URGENT_TASK: &str = "CONCEPT_URGENT_TASK";
pub const CONCEPT_ANALYTICAL_INPUT: &str = "CONCEPT_ANALYTICAL_INPUT";
pub const CONCEPT_BACKGROUND_NOISE: &str = "CONCEPT_BACKGROUND_NOISE";

/// Urgency above which input is treated as an urgent task
const URGENCY_THRESHOLD: f64 = 0.8;
/// Messages at least this many chars long are LONG
const LONG_INPUT_CHARS: usize = 64;
/// Summaries keep this many chars
const SUMMARY_CHARS: usize = 80;

const NO_RELATED: &str = "No related concepts found.";

// =============================================================================
// M1: Perception
// =============================================================================

/// Output of M1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percept {
    /// Whitespace-separated word count
    pub tokens: usize,
    /// Message length in chars
    pub len: usize,
    /// `[feature1, feature2, urgency]`
    pub vector: [f64; 3],
}

/// Build a percept from the message and the optional context features
pub fn perceive(message: &str, context: Option<&serde_json::Value>) -> Percept {
    let feature = |key: &str| {
        context
            .and_then(|c| c.get(key))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0)
    };

    Percept {
        tokens: message.split_whitespace().count(),
        len: message.chars().count(),
        vector: [feature("feature1"), feature("feature2"), feature("urgency")],
    }
}

// =============================================================================
// M2: Memory
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    Stored,
    Ignored,
}

/// Output of M2
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryAssessment {
    pub surprise: f64,
    pub status: MemoryStatus,
}

/// Surprise is the Euclidean norm of the percept vector
pub fn assess_surprise(percept: &Percept, threshold: f64) -> MemoryAssessment {
    let surprise = percept.vector.iter().map(|c| c * c).sum::<f64>().sqrt();
    let status = if surprise > threshold {
        MemoryStatus::Stored
    } else {
        MemoryStatus::Ignored
    };
    MemoryAssessment { surprise, status }
}

// =============================================================================
// M3: Abstraction
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LengthClass {
    Short,
    Long,
}

/// Output of M3
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Abstraction {
    pub concept: &'static str,
    pub length: LengthClass,
}

pub fn abstract_percept(percept: &Percept) -> Abstraction {
    let [feature1, feature2, urgency] = percept.vector;
    let concept = if urgency > URGENCY_THRESHOLD {
        CONCEPT_URGENT_TASK
    } else if feature1 > feature2 {
        CONCEPT_ANALYTICAL_INPUT
    } else {
        CONCEPT_BACKGROUND_NOISE
    };
    let length = if percept.len >= LONG_INPUT_CHARS {
        LengthClass::Long
    } else {
        LengthClass::Short
    };
    Abstraction { concept, length }
}

// =============================================================================
// M4: Reasoning
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Summarize,
    Verbatim,
}

/// Output of M4
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reasoning {
    pub related: Vec<String>,
    pub plan: Plan,
}

pub fn reason(knowledge: &BTreeMap<String, Vec<String>>, abstraction: &Abstraction) -> Reasoning {
    let related = knowledge
        .get(abstraction.concept)
        .cloned()
        .unwrap_or_else(|| vec![NO_RELATED.to_string()]);
    let plan = match abstraction.length {
        LengthClass::Long => Plan::Summarize,
        LengthClass::Short => Plan::Verbatim,
    };
    Reasoning { related, plan }
}

// =============================================================================
// M5: Agency
// =============================================================================

/// Output of M5
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub decision: String,
    pub plan: Plan,
    pub output: String,
    pub delta_uncertainty: f64,
}

pub fn act(reasoning: &Reasoning, message: &str) -> Action {
    let decision = match reasoning.related.iter().find(|a| a.contains("ACTION_")) {
        Some(action) => format!("Decision: Execute '{}'.", action),
        None => match reasoning.related.first() {
            Some(first) => format!("Decision: Fallback to '{}'.", first),
            None => "Decision: No action required.".to_string(),
        },
    };

    let (output, delta_uncertainty) = match reasoning.plan {
        Plan::Summarize => (summarize(message), 0.1),
        Plan::Verbatim => (message.to_string(), 0.02),
    };

    Action {
        decision,
        plan: reasoning.plan,
        output,
        delta_uncertainty,
    }
}

fn summarize(message: &str) -> String {
    if message.chars().count() > SUMMARY_CHARS {
        let head: String = message.chars().take(SUMMARY_CHARS).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_knowledge_base;
    use serde_json::json;

    #[test]
    fn test_perceive_reads_context_features() {
        let context = json!({"feature1": 0.5, "feature2": 0.3, "urgency": 0.9});
        let percept = perceive("check the  server", Some(&context));
        assert_eq!(percept.tokens, 3);
        assert_eq!(percept.len, 17);
        assert_eq!(percept.vector, [0.5, 0.3, 0.9]);
    }

    #[test]
    fn test_perceive_defaults_missing_features() {
        let context = json!({"feature1": "high", "urgency": 1});
        let percept = perceive("", Some(&context));
        assert_eq!(percept.tokens, 0);
        assert_eq!(percept.vector, [0.0, 0.0, 1.0]);

        assert_eq!(perceive("hi", None).vector, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_surprise() {
        let percept = perceive("x", Some(&json!({"feature1": 0.6, "feature2": 0.8})));
        let assessment = assess_surprise(&percept, 1.0);
        assert!((assessment.surprise - 1.0).abs() < 1e-9);

        let loud = perceive("x", Some(&json!({"feature1": 0.9, "feature2": 0.9, "urgency": 0.9})));
        assert_eq!(assess_surprise(&loud, 1.0).status, MemoryStatus::Stored);
        assert_eq!(assess_surprise(&loud, 2.0).status, MemoryStatus::Ignored);
    }

    #[test]
    fn test_abstraction_concepts() {
        let urgent = perceive("x", Some(&json!({"feature1": 0.5, "feature2": 0.3, "urgency": 0.9})));
        assert_eq!(abstract_percept(&urgent).concept, CONCEPT_URGENT_TASK);

        let analytical = perceive("x", Some(&json!({"feature1": 0.9, "feature2": 0.2, "urgency": 0.1})));
        assert_eq!(abstract_percept(&analytical).concept, CONCEPT_ANALYTICAL_INPUT);

        let noise = perceive("x", Some(&json!({"feature1": 0.1, "feature2": 0.2})));
        assert_eq!(abstract_percept(&noise).concept, CONCEPT_BACKGROUND_NOISE);
    }

    #[test]
    fn test_abstraction_length_class() {
        assert_eq!(abstract_percept(&perceive(&"a".repeat(63), None)).length, LengthClass::Short);
        assert_eq!(abstract_percept(&perceive(&"a".repeat(64), None)).length, LengthClass::Long);
    }

    #[test]
    fn test_reason_uses_knowledge_base() {
        let kb = default_knowledge_base();
        let abstraction = Abstraction {
            concept: CONCEPT_URGENT_TASK,
            length: LengthClass::Long,
        };
        let reasoning = reason(&kb, &abstraction);
        assert_eq!(
            reasoning.related,
            vec!["ACTION_ALLOCATE_RESOURCES", "NOTIFY_SUPERVISOR"]
        );
        assert_eq!(reasoning.plan, Plan::Summarize);

        let abstraction = Abstraction {
            concept: CONCEPT_BACKGROUND_NOISE,
            length: LengthClass::Short,
        };
        let reasoning = reason(&kb, &abstraction);
        assert_eq!(reasoning.related, vec![NO_RELATED]);
        assert_eq!(reasoning.plan, Plan::Verbatim);
    }

    #[test]
    fn test_act_decisions() {
        let execute = Reasoning {
            related: vec!["NOTIFY".to_string(), "ACTION_RUN_ANALYSIS".to_string()],
            plan: Plan::Verbatim,
        };
        assert_eq!(act(&execute, "m").decision, "Decision: Execute 'ACTION_RUN_ANALYSIS'.");

        let fallback = Reasoning {
            related: vec![NO_RELATED.to_string()],
            plan: Plan::Verbatim,
        };
        assert_eq!(
            act(&fallback, "m").decision,
            "Decision: Fallback to 'No related concepts found.'."
        );

        let nothing = Reasoning {
            related: vec![],
            plan: Plan::Verbatim,
        };
        assert_eq!(act(&nothing, "m").decision, "Decision: No action required.");
    }

    #[test]
    fn test_act_output() {
        let long_message = "This is a very long input that should trigger the summarize plan in our toy pipeline.";
        let summarize_plan = Reasoning {
            related: vec![],
            plan: Plan::Summarize,
        };
        let action = act(&summarize_plan, long_message);
        assert_eq!(action.output.chars().count(), 83);
        assert!(action.output.ends_with("..."));
        assert_eq!(action.delta_uncertainty, 0.1);

        let verbatim = Reasoning {
            related: vec![],
            plan: Plan::Verbatim,
        };
        let action = act(&verbatim, "short");
        assert_eq!(action.output, "short");
        assert_eq!(action.delta_uncertainty, 0.02);
    }

    #[test]
    fn test_summarize_is_char_safe() {
        let message = "é".repeat(100);
        let summary = summarize(&message);
        assert_eq!(summary.chars().count(), 83);
    }
}
