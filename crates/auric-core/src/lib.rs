//! Core data model for the auric prediction engine
//!
//! This crate defines the shared vocabulary of the workspace:
//!
//! - [`plan`]: analysis steps, step kinds, and the growable analysis plan
//! - [`prediction`]: the structured prediction artifact and run output
//! - [`request`]: run input (symbol + caller preferences) and its validation
//! - [`results`]: the closed set of typed tool result shapes
//! - [`error`]: the run-level fault taxonomy
//!
//! Everything here is plain data; behavior lives in `auric-agent` and the
//! tool provider crates.

pub mod error;
pub mod plan;
pub mod prediction;
pub mod request;
pub mod results;

// Re-export main types for convenience
pub use error::{AgentError, Result};
pub use plan::{AnalysisPlan, AnalysisStep, StepKind};
pub use prediction::{
    KeyLevels, MacroTrend, MicroTrend, Prediction, PredictionResponse, RunMetadata, TrendDirection,
};
pub use request::{Preferences, PredictionRequest, RiskTolerance, Strategy, TimePreference};
pub use results::{FallbackResult, ToolOutput};
