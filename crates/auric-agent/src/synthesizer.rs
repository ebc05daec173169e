//! Synthesis of working-memory context into a prediction artifact
//!
//! A [`Synthesizer`] folds the read-only [`AnalysisContext`] into the final
//! structured prediction. Implementations must be pure with respect to their
//! input: the same context always yields the same prediction. The shipped
//! [`RuleSynthesizer`] scores directional drivers out of the typed tool
//! payloads; a generative synthesizer can replace it behind the same trait.

use crate::memory::AnalysisContext;
use async_trait::async_trait;
use auric_core::Result;
use auric_core::prediction::{KeyLevels, MacroTrend, MicroTrend, Prediction, TrendDirection};
use auric_core::results::{IndicatorSnapshot, LevelSet, ToolOutput};

const MACRO_TIMEFRAME: &str = "2_weeks";
const MICRO_TIMEFRAME: &str = "3_days";

/// Folds an analysis context into a prediction
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, context: &AnalysisContext) -> Result<Prediction>;
}

/// Deterministic rule-based synthesizer
#[derive(Debug, Default)]
pub struct RuleSynthesizer;

impl RuleSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

/// Directional inputs recovered from the confirmed facts
#[derive(Debug, Default)]
struct Signals {
    indicators: Option<IndicatorSnapshot>,
    levels: LevelSet,
    alignment_bias: Option<String>,
    regime: Option<String>,
    volatility: Option<String>,
    sentiment: Option<f64>,
    insufficient: bool,
    fallback_count: usize,
}

fn gather(context: &AnalysisContext) -> Signals {
    let mut signals = Signals::default();

    for value in context.confirmed_facts.values() {
        match ToolOutput::from_value(value) {
            Some(ToolOutput::Fallback(_)) => signals.fallback_count += 1,
            Some(ToolOutput::TechnicalAnalysis(technical)) => {
                if technical.insufficient_data {
                    signals.insufficient = true;
                }
                signals.indicators = technical.indicators;
                if !technical.key_levels.support.is_empty()
                    || !technical.key_levels.resistance.is_empty()
                {
                    signals.levels = technical.key_levels;
                }
            }
            Some(ToolOutput::SupportResistance(levels)) => {
                signals.levels = LevelSet {
                    support: levels.support,
                    resistance: levels.resistance,
                };
            }
            Some(ToolOutput::TimeframeAlignment(alignment)) => {
                signals.alignment_bias = Some(alignment.overall_bias);
            }
            Some(ToolOutput::MarketRegime(regime)) => {
                signals.regime = Some(regime.regime);
                signals.volatility = Some(regime.volatility);
            }
            Some(ToolOutput::NewsSentiment(sentiment)) => {
                if sentiment.insufficient_data {
                    signals.insufficient = true;
                } else {
                    signals.sentiment = Some(sentiment.overall_sentiment);
                }
            }
            // Raw collected data and unrecognized payloads carry no
            // directional weight of their own
            Some(ToolOutput::MarketData(_)) | None => {}
        }
    }

    signals
}

fn score_drivers(signals: &Signals) -> (i32, Vec<&'static str>) {
    let mut score = 0;
    let mut drivers = Vec::new();

    if let Some(indicators) = &signals.indicators {
        if indicators.macd > 0.0 {
            score += 1;
            drivers.push("positive MACD");
        } else if indicators.macd < 0.0 {
            score -= 1;
            drivers.push("negative MACD");
        }
        if indicators.moving_average_20 > indicators.moving_average_50 {
            score += 1;
            drivers.push("MA20 above MA50");
        } else if indicators.moving_average_20 < indicators.moving_average_50 {
            score -= 1;
            drivers.push("MA20 below MA50");
        }
    }

    match signals.alignment_bias.as_deref() {
        Some("bullish") => {
            score += 1;
            drivers.push("bullish timeframe alignment");
        }
        Some("bearish") => {
            score -= 1;
            drivers.push("bearish timeframe alignment");
        }
        _ => {}
    }

    match signals.regime.as_deref() {
        Some("trending_bullish") => {
            score += 1;
            drivers.push("bullish trending regime");
        }
        Some("trending_bearish") => {
            score -= 1;
            drivers.push("bearish trending regime");
        }
        _ => {}
    }

    if let Some(sentiment) = signals.sentiment {
        if sentiment > 0.6 {
            score += 1;
            drivers.push("supportive sentiment");
        } else if sentiment < 0.4 {
            score -= 1;
            drivers.push("negative sentiment");
        }
    }

    (score, drivers)
}

#[async_trait]
impl Synthesizer for RuleSynthesizer {
    async fn synthesize(&self, context: &AnalysisContext) -> Result<Prediction> {
        if context.confirmed_facts.is_empty() {
            return Ok(Prediction::neutral(
                "Insufficient analysis context for a confident prediction",
                "No confirmed facts were available at synthesis time",
            ));
        }

        let signals = gather(context);
        let (score, drivers) = score_drivers(&signals);

        let degraded = signals.fallback_count > 0 || signals.insufficient;
        let penalty = if degraded { 0.1 } else { 0.0 };

        let macro_direction = if score >= 2 {
            TrendDirection::Bullish
        } else if score <= -2 {
            TrendDirection::Bearish
        } else if score == 0 {
            TrendDirection::Neutral
        } else {
            TrendDirection::Consolidation
        };
        let macro_confidence =
            ((0.5 + 0.08 * f64::from(score.abs())).min(0.85) - penalty).clamp(0.3, 0.9);
        let rationale = if drivers.is_empty() {
            "No directional drivers emerged from the confirmed analysis".to_string()
        } else {
            format!("Driven by {}", drivers.join(", "))
        };

        let (micro_direction, expected_action) = match &signals.indicators {
            Some(ind) if ind.rsi >= 70.0 => (
                TrendDirection::ConsolidationBearish,
                "Stretched conditions favor a cooling-off toward nearby support",
            ),
            Some(ind) if ind.rsi <= 30.0 => (
                TrendDirection::ConsolidationBullish,
                "Washed-out conditions favor a relief bounce toward resistance",
            ),
            Some(ind) if ind.macd > 0.0 => (
                TrendDirection::Bullish,
                "Momentum favors a push toward immediate resistance",
            ),
            Some(ind) if ind.macd < 0.0 => (
                TrendDirection::Bearish,
                "Momentum favors a drift toward immediate support",
            ),
            _ => (
                TrendDirection::Neutral,
                "Market likely to continue current range",
            ),
        };
        let micro_confidence = if signals.indicators.is_some() {
            (0.65 - penalty).clamp(0.3, 0.9)
        } else {
            0.5
        };

        let breakout_level = signals.levels.resistance.iter().copied().reduce(f64::max);
        let key_levels = KeyLevels {
            immediate_support: signals.levels.support.clone(),
            immediate_resistance: signals.levels.resistance.clone(),
            breakout_level,
        };

        let mut risk_factors = Vec::new();
        if signals.fallback_count > 0 {
            risk_factors.push(format!(
                "{} analysis step(s) degraded to fallback output",
                signals.fallback_count
            ));
        }
        if signals.insufficient {
            risk_factors.push("Thin market history limits indicator reliability".to_string());
        }
        if signals.sentiment.is_none() {
            risk_factors.push("No sentiment coverage in this run".to_string());
        }
        if signals.volatility.as_deref() == Some("high") {
            risk_factors.push("Elevated volatility regime".to_string());
        }
        if !context.active_hypotheses.is_empty() {
            risk_factors.push("Unresolved working hypotheses remain".to_string());
        }
        if risk_factors.is_empty() {
            risk_factors.push("Market awaiting fresh catalysts".to_string());
        }

        let agent_notes = format!(
            "Synthesized from {} confirmed facts, {} evidence records, and {} hypotheses",
            context.confirmed_facts.len(),
            context.analysis_summary.total_evidence,
            context.analysis_summary.total_hypotheses
        );

        Ok(Prediction {
            macro_trend: MacroTrend {
                direction: macro_direction,
                confidence: macro_confidence,
                timeframe: MACRO_TIMEFRAME.to_string(),
                rationale,
            },
            micro_trend: MicroTrend {
                direction: micro_direction,
                confidence: micro_confidence,
                timeframe: MICRO_TIMEFRAME.to_string(),
                expected_action: expected_action.to_string(),
            },
            key_levels,
            risk_factors,
            agent_notes: Some(agent_notes),
        })
    }
}
