//! Typed tool result shapes
//!
//! Tool payloads travel through the memory as JSON values, but the set of
//! shapes is closed: every tool serializes one of these structs, and the
//! synthesizer deserializes facts back through [`ToolOutput`] rather than
//! probing untyped bags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Synthetic result recorded for a step whose tool failed or did not resolve.
///
/// `fallback` is always true; its presence lets downstream consumers
/// distinguish genuine analysis from degraded output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResult {
    pub error: String,
    pub fallback: bool,
    pub tool: String,
    pub timestamp: DateTime<Utc>,
}

impl FallbackResult {
    pub fn new(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fallback: true,
            tool: tool.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One aggregated OHLC bar at a named timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedBar {
    pub timeframe: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

/// Output of the market-data collection tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataResult {
    pub symbol: String,
    pub timeframes: Vec<String>,
    /// Empty when no candles are loaded; an empty collection on a
    /// data-collection step triggers plan adjustment
    pub data: Vec<AggregatedBar>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalPattern {
    pub name: String,
    pub confidence: f64,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSet {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub moving_average_20: f64,
    pub moving_average_50: f64,
}

/// Output of the technical-pattern analysis tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysisResult {
    pub symbol: String,
    pub patterns: Vec<TechnicalPattern>,
    pub key_levels: LevelSet,
    /// Absent when there is too little history to compute them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSnapshot>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insufficient_data: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    pub sentiment: f64,
    pub published_at: DateTime<Utc>,
}

/// Output of the sentiment tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSentimentResult {
    pub symbol: String,
    pub lookback_hours: u64,
    pub articles: Vec<NewsArticle>,
    /// In [0, 1]; 0.5 is neutral
    pub overall_sentiment: f64,
    /// How the score was produced (e.g. a price-momentum proxy)
    pub method: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insufficient_data: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResistanceResult {
    pub symbol: String,
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeAlignment {
    pub symbol: String,
    pub alignment: String,
    pub conflicts: Vec<String>,
    pub overall_bias: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRegimeResult {
    pub symbol: String,
    pub regime: String,
    pub volatility: String,
    /// In [0, 1]
    pub trend_strength: f64,
    pub timestamp: DateTime<Utc>,
}

/// Closed union of every payload a tool may produce.
///
/// Variants carry disjoint required fields, so untagged deserialization is
/// unambiguous; [`FallbackResult`] is tried first since its `error`/`fallback`
/// pair never appears on genuine results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Fallback(FallbackResult),
    TechnicalAnalysis(TechnicalAnalysisResult),
    MarketData(MarketDataResult),
    NewsSentiment(NewsSentimentResult),
    SupportResistance(SupportResistanceResult),
    TimeframeAlignment(TimeframeAlignment),
    MarketRegime(MarketRegimeResult),
}

impl ToolOutput {
    /// Parse a stored fact value back into its typed shape, if it has one
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
