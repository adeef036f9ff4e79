//! TITANS cognitive pipeline
//!
//! The local `titans` chat agent: five pure stages (perception, memory,
//! abstraction, reasoning, agency) whose outputs are recorded as a
//! hash-chained trace.

pub mod agent;
pub mod canonical;
pub mod handler;
pub mod stages;
pub mod trace;

pub use agent::{demo_scenarios, CognitiveRun, TitansAgent};
pub use handler::{traces_router, TracesState};
pub use trace::{verify_chain, StepDraft, TraceLog, TraceStep};
