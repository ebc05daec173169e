//! Prediction artifact and run output types

use serde::{Deserialize, Serialize};

/// Directional call for a trend, at either horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
    Consolidation,
    ConsolidationBullish,
    ConsolidationBearish,
}

/// Multi-week outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTrend {
    pub direction: TrendDirection,
    /// In [0, 1]
    pub confidence: f64,
    pub timeframe: String,
    pub rationale: String,
}

/// Multi-day outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroTrend {
    pub direction: TrendDirection,
    /// In [0, 1]
    pub confidence: f64,
    pub timeframe: String,
    pub expected_action: String,
}

/// Price levels the prediction pivots around
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLevels {
    pub immediate_support: Vec<f64>,
    pub immediate_resistance: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout_level: Option<f64>,
}

/// The structured prediction artifact produced by synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub macro_trend: MacroTrend,
    pub micro_trend: MicroTrend,
    pub key_levels: KeyLevels,
    pub risk_factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_notes: Option<String>,
}

impl Prediction {
    /// Static neutral prediction used whenever a run cannot complete
    /// normally: both horizons neutral at 0.5 confidence, no key levels,
    /// a single risk factor naming the degradation.
    pub fn neutral(risk_factor: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            macro_trend: MacroTrend {
                direction: TrendDirection::Neutral,
                confidence: 0.5,
                timeframe: "2_weeks".to_string(),
                rationale: "Insufficient data for confident prediction".to_string(),
            },
            micro_trend: MicroTrend {
                direction: TrendDirection::Neutral,
                confidence: 0.5,
                timeframe: "3_days".to_string(),
                expected_action: "Market likely to continue current range".to_string(),
            },
            key_levels: KeyLevels::default(),
            risk_factors: vec![risk_factor.into()],
            agent_notes: Some(notes.into()),
        }
    }
}

/// Per-run telemetry, computed once and immutable after return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub analysis_strategy: String,
    /// De-duplicated; ordering carries no meaning
    pub tools_used: Vec<String>,
    pub data_sources_analyzed: Vec<String>,
    pub reasoning_steps: usize,
    pub total_analysis_time: String,
    pub confidence_calibration: String,
}

/// Top-level run output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub success: bool,
    pub symbol: String,
    pub prediction: Prediction,
    pub run_metadata: RunMetadata,
}
