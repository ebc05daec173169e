//! Agentic analysis core for auric
//!
//! The control loop behind a prediction run:
//!
//! 1. A [`planner::PlanProposer`] turns the subject, caller preferences, and
//!    the registered tool names into an ordered [`auric_core::AnalysisPlan`].
//! 2. The [`orchestrator::Orchestrator`] executes the plan against an
//!    immutable tool registry through an explicit FIFO work queue, storing
//!    every result in a per-run [`memory::WorkingMemory`] and appending
//!    recovery steps to the same in-flight queue when a step fails or comes
//!    back data-poor.
//! 3. A [`synthesizer::Synthesizer`] folds the memory's context into the
//!    final structured prediction.
//!
//! No fault escapes `run`: step-level problems degrade to tagged fallback
//! facts, run-level problems to a static neutral prediction.

pub mod memory;
pub mod orchestrator;
pub mod planner;
pub mod synthesizer;

// Re-export main types for convenience
pub use memory::{
    AnalysisContext, ConfidenceMetrics, Evidence, Fact, HistoryEntry, Hypothesis,
    HypothesisStatus, MemorySummary, WorkingMemory,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorState, RunState};
pub use planner::{HeuristicPlanner, PlanProposer};
pub use synthesizer::{RuleSynthesizer, Synthesizer};
