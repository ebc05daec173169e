//! Analysis run orchestrator
//!
//! Drives one run end to end: plan formulation, step execution against the
//! tool registry, failure absorption, dynamic plan extension, reflection, and
//! synthesis. Step results land in a per-run working memory keyed by step
//! kind, so a later step of the same kind supersedes an earlier one's fact
//! (single slot per kind, intentional).
//!
//! `run` never returns an error: step-level faults degrade to fallback facts
//! and run-level faults degrade to a static neutral prediction, both tagged
//! so consumers can tell degraded output from genuine analysis.
//!
//! One orchestrator value serves one run at a time (`run` takes `&mut self`);
//! concurrent runs get their own orchestrator over the same shared registry.

use crate::memory::{
    AnalysisContext, ConfidenceMetrics, HistoryEntry, HypothesisStatus, WorkingMemory,
};
use crate::planner::PlanProposer;
use crate::synthesizer::Synthesizer;
use auric_core::plan::{AnalysisStep, StepKind};
use auric_core::prediction::{Prediction, PredictionResponse, RunMetadata};
use auric_core::request::PredictionRequest;
use auric_core::results::{FallbackResult, ToolOutput};
use auric_core::{AgentError, Result};
use auric_tools::ToolRegistry;
use auric_utils::elapsed_label;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Run lifecycle states, observable through [`Orchestrator::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Planning,
    Executing,
    Synthesizing,
    Done,
    Faulted,
    FallbackDone,
}

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wall-clock budget for a run, checked between steps; `None` disables it
    pub run_timeout: Option<Duration>,
    /// Tool used for appended recovery data-collection steps
    pub fallback_data_tool: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            run_timeout: None,
            fallback_data_tool: "get_market_data".to_string(),
        }
    }
}

/// Introspection snapshot combining memory context and run counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorState {
    pub state: RunState,
    pub working_memory: AnalysisContext,
    pub tools_used: Vec<String>,
    pub reasoning_steps: usize,
}

/// Drives analysis runs over an immutable tool registry
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    planner: Arc<dyn PlanProposer>,
    synthesizer: Arc<dyn Synthesizer>,
    config: OrchestratorConfig,
    memory: WorkingMemory,
    state: RunState,
    tools_used: HashSet<String>,
    kinds_executed: HashSet<StepKind>,
    reasoning_steps: usize,
    run_started: Option<Instant>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        planner: Arc<dyn PlanProposer>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self::with_config(registry, planner, synthesizer, OrchestratorConfig::default())
    }

    pub fn with_config(
        registry: Arc<ToolRegistry>,
        planner: Arc<dyn PlanProposer>,
        synthesizer: Arc<dyn Synthesizer>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            planner,
            synthesizer,
            config,
            memory: WorkingMemory::new(),
            state: RunState::Idle,
            tools_used: HashSet::new(),
            kinds_executed: HashSet::new(),
            reasoning_steps: 0,
            run_started: None,
        }
    }

    /// Execute one analysis run under the configured deadline. Never returns
    /// an error and never panics: any fault not absorbed at step level
    /// degrades to the static neutral fallback prediction, still with
    /// `success: true`.
    pub async fn run(&mut self, request: &PredictionRequest) -> PredictionResponse {
        let deadline = self.config.run_timeout;
        self.run_with_deadline(request, deadline).await
    }

    /// Like [`run`](Self::run) but with an explicit per-call deadline,
    /// checked between steps; `None` disables it for this run.
    pub async fn run_with_deadline(
        &mut self,
        request: &PredictionRequest,
        deadline: Option<Duration>,
    ) -> PredictionResponse {
        self.reset();
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        self.run_started = Some(started);

        tracing::info!(%run_id, symbol = %request.symbol, "starting analysis run");

        match self.execute_run(request, started, deadline).await {
            Ok(response) => {
                self.state = RunState::Done;
                tracing::info!(
                    %run_id,
                    symbol = %request.symbol,
                    steps = self.reasoning_steps,
                    "analysis run complete"
                );
                response
            }
            Err(err) => {
                self.state = RunState::Faulted;
                tracing::error!(
                    %run_id,
                    symbol = %request.symbol,
                    kind = err.kind(),
                    error = %err,
                    "analysis run faulted; returning fallback prediction"
                );
                let response = self.fallback_response(request, started);
                self.state = RunState::FallbackDone;
                response
            }
        }
    }

    async fn execute_run(
        &mut self,
        request: &PredictionRequest,
        started: Instant,
        deadline: Option<Duration>,
    ) -> Result<PredictionResponse> {
        request.validate()?;

        // Planning
        self.state = RunState::Planning;
        let available = self.registry.tool_names();
        let plan = self
            .planner
            .propose(&request.symbol, &request.preferences, &available)
            .await
            .map_err(|err| match err {
                AgentError::PlanFormulation(_) => err,
                other => AgentError::PlanFormulation(other.to_string()),
            })?;
        validate_plan_steps(&plan.steps)?;
        tracing::info!(
            symbol = %request.symbol,
            rationale = %plan.rationale,
            steps = plan.steps.len(),
            "analysis plan formulated"
        );

        // Executing: an explicit FIFO queue so recovery steps appended
        // mid-run are executed within this run, after everything already
        // queued ahead of them
        self.state = RunState::Executing;
        let mut queue: VecDeque<AnalysisStep> = plan.steps.into();
        while let Some(step) = queue.pop_front() {
            check_deadline(started, deadline)?;

            let result = self.execute_step(&step, &request.symbol).await;
            self.memory
                .store_fact(step.kind.storage_key(), result.clone(), step.tool.as_str());
            self.kinds_executed.insert(step.kind);
            self.reasoning_steps += 1;

            if needs_adjustment(&step, &result) {
                let recovery = self.recovery_step();
                tracing::info!(
                    after = %step.tool,
                    tool = %recovery.tool,
                    "appending fallback data-collection step to the in-flight plan"
                );
                queue.push_back(recovery);
            }
        }

        self.reflect(&request.symbol);

        // Synthesizing
        self.state = RunState::Synthesizing;
        let context = self.memory.context();
        let mut prediction = self
            .synthesizer
            .synthesize(&context)
            .await
            .map_err(|err| match err {
                AgentError::Synthesis(_) => err,
                other => AgentError::Synthesis(other.to_string()),
            })?;

        // Honor caller-provided reporting horizons
        if let Some(horizons) = &request.preferences.time_preference {
            if let Some(macro_horizon) = &horizons.macro_horizon {
                prediction.macro_trend.timeframe = macro_horizon.clone();
            }
            if let Some(micro_horizon) = &horizons.micro_horizon {
                prediction.micro_trend.timeframe = micro_horizon.clone();
            }
        }

        let run_metadata = self.run_metadata(request, started);
        Ok(PredictionResponse {
            success: true,
            symbol: request.symbol.clone(),
            prediction,
            run_metadata,
        })
    }

    /// Resolve and execute one step. Never fails: an unresolved tool or a
    /// failing execution yields a tagged fallback result instead.
    async fn execute_step(&mut self, step: &AnalysisStep, symbol: &str) -> Value {
        let Some(tool) = self.registry.get(&step.tool) else {
            let err = AgentError::ToolResolution {
                tool: step.tool.clone(),
            };
            tracing::warn!(tool = %step.tool, kind = %step.kind, "tool not registered; recording fallback fact");
            return fallback_value(&step.tool, &err.to_string());
        };

        self.tools_used.insert(step.tool.clone());
        let params = enrich_params(&step.params, symbol);
        tracing::debug!(tool = %step.tool, kind = %step.kind, "executing analysis step");

        match tool.execute(params).await {
            Ok(value) => value,
            Err(err) => {
                let err = AgentError::ToolExecution {
                    tool: step.tool.clone(),
                    message: err.to_string(),
                };
                tracing::warn!(
                    tool = %step.tool,
                    error = %err,
                    "tool execution failed; continuing with fallback fact"
                );
                fallback_value(&step.tool, &err.to_string())
            }
        }
    }

    /// After the queue drains: when technical and sentiment facts are both
    /// present, open a directional hypothesis over them and resolve it by
    /// signal agreement. Agreement corroborates the technical fact.
    fn reflect(&mut self, symbol: &str) {
        let technical = self
            .memory
            .fact(StepKind::TechnicalAnalysis.storage_key())
            .map(|f| f.value.clone());
        let sentiment = self
            .memory
            .fact(StepKind::SentimentAnalysis.storage_key())
            .map(|f| f.value.clone());
        let (Some(technical), Some(sentiment)) = (technical, sentiment) else {
            return;
        };
        let (Some(technical_bias), Some(sentiment_bias)) =
            (directional_hint(&technical), sentiment_hint(&sentiment))
        else {
            return;
        };

        let description =
            format!("{symbol} technical and sentiment signals align {technical_bias}");
        self.memory.formulate_hypothesis(
            &description,
            vec![
                StepKind::TechnicalAnalysis.storage_key().to_string(),
                StepKind::SentimentAnalysis.storage_key().to_string(),
            ],
            Vec::new(),
        );

        if technical_bias == sentiment_bias {
            self.memory
                .update_hypothesis_status(&description, HypothesisStatus::Confirmed, 0.75);
            self.memory
                .add_evidence(StepKind::TechnicalAnalysis.storage_key(), sentiment);
            tracing::debug!(symbol, bias = technical_bias, "signal-agreement hypothesis confirmed");
        } else {
            self.memory
                .update_hypothesis_status(&description, HypothesisStatus::Rejected, 0.25);
            tracing::debug!(
                symbol,
                technical = technical_bias,
                sentiment = sentiment_bias,
                "signal-agreement hypothesis rejected"
            );
        }
    }

    fn recovery_step(&self) -> AnalysisStep {
        AnalysisStep::new(
            StepKind::DataCollection,
            self.config.fallback_data_tool.clone(),
            "Fallback data collection",
        )
        .with_param("fallback", json!(true))
        .with_param("basic", json!(true))
    }

    fn run_metadata(&self, request: &PredictionRequest, started: Instant) -> RunMetadata {
        let mut data_sources: Vec<String> = self
            .kinds_executed
            .iter()
            .map(|kind| kind.data_source_label().to_string())
            .collect();
        data_sources.sort();

        RunMetadata {
            analysis_strategy: request.strategy().metadata_label().to_string(),
            tools_used: self.tools_used.iter().cloned().collect(),
            data_sources_analyzed: data_sources,
            reasoning_steps: self.reasoning_steps,
            total_analysis_time: elapsed_label(started.elapsed()),
            confidence_calibration: calibration_label(&self.memory.confidence_metrics())
                .to_string(),
        }
    }

    fn fallback_response(
        &mut self,
        request: &PredictionRequest,
        started: Instant,
    ) -> PredictionResponse {
        let prediction = Prediction::neutral(
            "Analysis system encountered errors",
            "Fallback prediction due to system issues",
        );
        let run_metadata = self.run_metadata(request, started);
        PredictionResponse {
            success: true,
            symbol: request.symbol.clone(),
            prediction,
            run_metadata,
        }
    }

    fn reset(&mut self) {
        self.memory.clear();
        self.tools_used.clear();
        self.kinds_executed.clear();
        self.reasoning_steps = 0;
        self.run_started = None;
        self.state = RunState::Idle;
    }

    // =========== Read-only introspection ===========

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_state(&self) -> OrchestratorState {
        OrchestratorState {
            state: self.state,
            working_memory: self.memory.context(),
            tools_used: self.tools_used(),
            reasoning_steps: self.reasoning_steps,
        }
    }

    /// Full ordered working-memory history for the last run
    pub fn reasoning_chain(&self) -> Vec<HistoryEntry> {
        self.memory.history()
    }

    /// De-duplicated tool names; ordering carries no meaning
    pub fn tools_used(&self) -> Vec<String> {
        self.tools_used.iter().cloned().collect()
    }

    /// Wall-clock time since run start (zero before the first run)
    pub fn analysis_duration(&self) -> Duration {
        self.run_started.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn confidence_metrics(&self) -> ConfidenceMetrics {
        self.memory.confidence_metrics()
    }
}

fn check_deadline(started: Instant, deadline: Option<Duration>) -> Result<()> {
    if let Some(timeout) = deadline {
        if started.elapsed() > timeout {
            return Err(AgentError::Internal(format!(
                "analysis deadline of {}ms exceeded between steps",
                timeout.as_millis()
            )));
        }
    }
    Ok(())
}

fn validate_plan_steps(steps: &[AnalysisStep]) -> Result<()> {
    for step in steps {
        if step.tool.trim().is_empty() {
            return Err(AgentError::PlanFormulation(format!(
                "step of kind '{}' names no tool",
                step.kind
            )));
        }
    }
    Ok(())
}

/// Copy step params and stamp run-scoped context into them
fn enrich_params(params: &Map<String, Value>, symbol: &str) -> Value {
    let mut enriched = params.clone();
    enriched.insert("symbol".to_string(), json!(symbol));
    enriched.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
    Value::Object(enriched)
}

fn fallback_value(tool: &str, error: &str) -> Value {
    serde_json::to_value(FallbackResult::new(tool, error)).unwrap_or_else(|_| {
        json!({
            "error": error,
            "fallback": true,
            "tool": tool,
        })
    })
}

/// Adjustment predicate: an error-tagged result, an explicit
/// `insufficientData` marker, or a data-collection step whose `data`
/// collection is missing or empty. Fallback steps never re-trigger, which
/// bounds recovery to exactly one appended step per triggering result.
fn needs_adjustment(step: &AnalysisStep, result: &Value) -> bool {
    if step.is_fallback() {
        return false;
    }
    if result.get("error").is_some() {
        return true;
    }
    if matches!(result.get("insufficientData"), Some(Value::Bool(true))) {
        return true;
    }
    step.kind == StepKind::DataCollection
        && result
            .get("data")
            .and_then(Value::as_array)
            .is_none_or(Vec::is_empty)
}

fn directional_hint(value: &Value) -> Option<&'static str> {
    match ToolOutput::from_value(value)? {
        ToolOutput::TechnicalAnalysis(technical) => {
            let indicators = technical.indicators?;
            if indicators.macd > 0.0 {
                Some("bullish")
            } else if indicators.macd < 0.0 {
                Some("bearish")
            } else {
                None
            }
        }
        ToolOutput::TimeframeAlignment(alignment) => match alignment.overall_bias.as_str() {
            "bullish" => Some("bullish"),
            "bearish" => Some("bearish"),
            _ => None,
        },
        ToolOutput::MarketRegime(regime) => match regime.regime.as_str() {
            "trending_bullish" => Some("bullish"),
            "trending_bearish" => Some("bearish"),
            _ => None,
        },
        _ => None,
    }
}

fn sentiment_hint(value: &Value) -> Option<&'static str> {
    match ToolOutput::from_value(value)? {
        ToolOutput::NewsSentiment(sentiment) if !sentiment.insufficient_data => {
            if sentiment.overall_sentiment > 0.6 {
                Some("bullish")
            } else if sentiment.overall_sentiment < 0.4 {
                Some("bearish")
            } else {
                None
            }
        }
        _ => None,
    }
}

fn calibration_label(metrics: &ConfidenceMetrics) -> &'static str {
    if metrics.average_fact_confidence >= 0.85 && metrics.low_confidence_facts == 0 {
        "confident"
    } else if metrics.average_fact_confidence >= 0.65 {
        "balanced"
    } else {
        "conservative"
    }
}
