//! Plan proposal
//!
//! The orchestrator asks a [`PlanProposer`] for an ordered step list at the
//! start of every run. The shipped [`HeuristicPlanner`] is a deterministic
//! per-strategy policy; a generative proposer can be dropped in behind the
//! same trait.

use async_trait::async_trait;
use auric_core::plan::{AnalysisPlan, AnalysisStep, StepKind};
use auric_core::request::{Preferences, Strategy};
use auric_core::Result;
use serde_json::json;

/// Produces an analysis plan for a subject given caller preferences and the
/// tool names currently registered
#[async_trait]
pub trait PlanProposer: Send + Sync {
    async fn propose(
        &self,
        symbol: &str,
        preferences: &Preferences,
        available_tools: &[String],
    ) -> Result<AnalysisPlan>;
}

/// Deterministic strategy-keyed planner
#[derive(Debug, Default)]
pub struct HeuristicPlanner;

impl HeuristicPlanner {
    pub fn new() -> Self {
        Self
    }

    fn comprehensive_plan() -> AnalysisPlan {
        AnalysisPlan::new("Comprehensive multi-timeframe analysis with sentiment integration")
            .with_step(
                AnalysisStep::new(
                    StepKind::DataCollection,
                    "get_market_data",
                    "Price action across multiple timeframes",
                )
                .with_param("timeframes", json!(["1h", "4h", "1d", "1w"])),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::TechnicalAnalysis,
                    "analyze_technical_patterns",
                    "Technical patterns and key levels",
                )
                .with_param("primaryTimeframe", json!("1d")),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::SentimentAnalysis,
                    "get_news_sentiment",
                    "Market sentiment and catalysts",
                )
                .with_param("lookbackHours", json!(48)),
            )
    }

    fn technical_plan() -> AnalysisPlan {
        AnalysisPlan::new("Structure-first technical read with level and timeframe confirmation")
            .with_step(
                AnalysisStep::new(
                    StepKind::DataCollection,
                    "get_market_data",
                    "Recent price action",
                )
                .with_param("timeframes", json!(["1h", "4h", "1d"])),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::TechnicalAnalysis,
                    "analyze_technical_patterns",
                    "Patterns and indicator posture",
                )
                .with_param("primaryTimeframe", json!("1d")),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::TechnicalAnalysis,
                    "detect_support_resistance",
                    "Key levels to trade around",
                )
                .with_param("sensitivity", json!(5)),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::TechnicalAnalysis,
                    "compare_timeframes",
                    "Cross-timeframe confirmation",
                )
                .with_param("timeframes", json!(["1h", "4h", "1d"])),
            )
    }

    fn sentiment_plan() -> AnalysisPlan {
        AnalysisPlan::new("Sentiment-led analysis with regime context")
            .with_step(
                AnalysisStep::new(
                    StepKind::DataCollection,
                    "get_market_data",
                    "Price action backdrop",
                )
                .with_param("timeframes", json!(["1h", "4h"])),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::SentimentAnalysis,
                    "get_news_sentiment",
                    "Sentiment and catalysts over a wide window",
                )
                .with_param("lookbackHours", json!(72)),
            )
            .with_step(AnalysisStep::new(
                StepKind::TechnicalAnalysis,
                "assess_market_regime",
                "Regime context for sentiment signals",
            ))
    }

    fn momentum_plan() -> AnalysisPlan {
        AnalysisPlan::new("Momentum alignment across timeframes and regimes")
            .with_step(
                AnalysisStep::new(
                    StepKind::DataCollection,
                    "get_market_data",
                    "Recent price action",
                )
                .with_param("timeframes", json!(["1h", "4h", "1d"])),
            )
            .with_step(
                AnalysisStep::new(
                    StepKind::TechnicalAnalysis,
                    "compare_timeframes",
                    "Momentum alignment across timeframes",
                )
                .with_param("timeframes", json!(["1h", "4h", "1d"])),
            )
            .with_step(AnalysisStep::new(
                StepKind::TechnicalAnalysis,
                "assess_market_regime",
                "Trend strength and volatility",
            ))
    }
}

#[async_trait]
impl PlanProposer for HeuristicPlanner {
    async fn propose(
        &self,
        symbol: &str,
        preferences: &Preferences,
        available_tools: &[String],
    ) -> Result<AnalysisPlan> {
        let strategy = preferences.strategy.unwrap_or_default();
        let plan = match strategy {
            Strategy::Comprehensive => Self::comprehensive_plan(),
            Strategy::Technical => Self::technical_plan(),
            Strategy::Sentiment => Self::sentiment_plan(),
            Strategy::Momentum => Self::momentum_plan(),
        };

        for step in &plan.steps {
            if !available_tools.iter().any(|name| name == &step.tool) {
                tracing::warn!(
                    symbol,
                    tool = %step.tool,
                    "planned tool is not registered; the step will degrade at execution time"
                );
            }
        }

        tracing::debug!(symbol, ?strategy, steps = plan.len(), "plan proposed");
        Ok(plan)
    }
}
