//! Analysis plan model
//!
//! A plan is an ordered list of tool invocations produced by a plan proposer
//! and consumed by the orchestrator. The step sequence is allowed to grow
//! while it is being consumed: recovery steps appended mid-run are executed
//! within the same run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category of one planned unit of work.
///
/// The kind doubles as the working-memory storage key for the step's result,
/// so a later step of the same kind supersedes an earlier one's fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    DataCollection,
    TechnicalAnalysis,
    SentimentAnalysis,
    Synthesis,
}

impl StepKind {
    /// Working-memory key under which results of this kind are stored
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::DataCollection => "data_collection",
            Self::TechnicalAnalysis => "technical_analysis",
            Self::SentimentAnalysis => "sentiment_analysis",
            Self::Synthesis => "synthesis",
        }
    }

    /// Data-source label reported in run metadata for this kind
    pub fn data_source_label(self) -> &'static str {
        match self {
            Self::DataCollection => "price_data",
            Self::TechnicalAnalysis => "technical_indicators",
            Self::SentimentAnalysis => "news_sentiment",
            Self::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// One planned tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStep {
    pub kind: StepKind,
    /// Name the tool must resolve to in the registry at execution time
    pub tool: String,
    /// Parameter bag handed to the tool (enriched with run context before execution)
    #[serde(default)]
    pub params: Map<String, Value>,
    /// What the proposer hopes this step will reveal
    pub expected_insight: String,
}

impl AnalysisStep {
    pub fn new(kind: StepKind, tool: impl Into<String>, expected_insight: impl Into<String>) -> Self {
        Self {
            kind,
            tool: tool.into(),
            params: Map::new(),
            expected_insight: expected_insight.into(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Whether this step was appended as a recovery step.
    ///
    /// Fallback steps never trigger further plan adjustment, which bounds
    /// recovery to exactly one appended step per triggering result.
    pub fn is_fallback(&self) -> bool {
        matches!(self.params.get("fallback"), Some(Value::Bool(true)))
    }
}

/// An ordered, growable sequence of steps plus the proposer's rationale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPlan {
    pub rationale: String,
    pub steps: Vec<AnalysisStep>,
}

impl AnalysisPlan {
    pub fn new(rationale: impl Into<String>) -> Self {
        Self {
            rationale: rationale.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: AnalysisStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
