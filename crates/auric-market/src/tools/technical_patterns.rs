//! Tool for technical pattern and key-level analysis

use async_trait::async_trait;
use auric_core::results::{IndicatorSnapshot, LevelSet, TechnicalAnalysisResult, TechnicalPattern};
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;
use crate::indicators;

/// Minimum bars before indicator output is trustworthy (MA50 warm-up)
const MIN_BARS: usize = 50;

/// Window of recent bars scanned for swing levels
const LEVEL_SCAN_BARS: usize = 288;

/// Tool for identifying technical patterns and key levels
pub struct TechnicalPatternsTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TechnicalParams {
    symbol: String,
    #[serde(default = "default_primary_timeframe")]
    primary_timeframe: String,
}

fn default_primary_timeframe() -> String {
    "1d".to_string()
}

impl TechnicalPatternsTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn analyze(&self, params: TechnicalParams) -> TechnicalAnalysisResult {
        let store = self.store.read().await;
        let closes = store.closes();

        if closes.len() < MIN_BARS {
            return TechnicalAnalysisResult {
                symbol: params.symbol,
                patterns: Vec::new(),
                key_levels: LevelSet::default(),
                indicators: None,
                insufficient_data: true,
                timestamp: Utc::now(),
            };
        }

        let (Some(rsi), Some(macd), Some(ma20), Some(ma50)) = (
            indicators::rsi(&closes, 14),
            indicators::macd_line(&closes),
            indicators::sma(&closes, 20),
            indicators::sma(&closes, 50),
        ) else {
            return TechnicalAnalysisResult {
                symbol: params.symbol,
                patterns: Vec::new(),
                key_levels: LevelSet::default(),
                indicators: None,
                insufficient_data: true,
                timestamp: Utc::now(),
            };
        };

        let last_close = closes[closes.len() - 1];
        let key_levels = indicators::swing_levels(store.last_n(LEVEL_SCAN_BARS), 5, 3);
        let patterns = derive_patterns(rsi, macd, ma20, ma50, last_close, &params.primary_timeframe);

        TechnicalAnalysisResult {
            symbol: params.symbol,
            patterns,
            key_levels,
            indicators: Some(IndicatorSnapshot {
                rsi,
                macd,
                moving_average_20: ma20,
                moving_average_50: ma50,
            }),
            insufficient_data: false,
            timestamp: Utc::now(),
        }
    }
}

fn derive_patterns(
    rsi: f64,
    macd: f64,
    ma20: f64,
    ma50: f64,
    last_close: f64,
    primary_timeframe: &str,
) -> Vec<TechnicalPattern> {
    let mut patterns = Vec::new();

    if ma20 > ma50 && macd > 0.0 {
        patterns.push(TechnicalPattern {
            name: "Uptrend Channel".to_string(),
            confidence: 0.75,
            timeframe: primary_timeframe.to_string(),
        });
    }
    if ma20 < ma50 && macd < 0.0 {
        patterns.push(TechnicalPattern {
            name: "Downtrend Channel".to_string(),
            confidence: 0.75,
            timeframe: primary_timeframe.to_string(),
        });
    }
    if rsi >= 70.0 {
        patterns.push(TechnicalPattern {
            name: "Overbought Extension".to_string(),
            confidence: 0.65,
            timeframe: primary_timeframe.to_string(),
        });
    }
    if rsi <= 30.0 {
        patterns.push(TechnicalPattern {
            name: "Oversold Reversal Zone".to_string(),
            confidence: 0.65,
            timeframe: primary_timeframe.to_string(),
        });
    }
    // MACD hugging zero relative to price marks a drifting range
    if macd.abs() < last_close * 0.0005 {
        patterns.push(TechnicalPattern {
            name: "Consolidation".to_string(),
            confidence: 0.6,
            timeframe: "4h".to_string(),
        });
    }

    if patterns.is_empty() {
        patterns.push(TechnicalPattern {
            name: "Mixed Structure".to_string(),
            confidence: 0.5,
            timeframe: primary_timeframe.to_string(),
        });
    }

    patterns
}

#[async_trait]
impl Tool for TechnicalPatternsTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: TechnicalParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.analyze(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "analyze_technical_patterns"
    }

    fn description(&self) -> &str {
        "Identify technical patterns, key support/resistance levels, and core \
         indicators (RSI, MACD, MA20, MA50) for a symbol."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Instrument symbol"
                },
                "primaryTimeframe": {
                    "type": "string",
                    "description": "Timeframe label attached to detected patterns",
                    "default": "1d"
                }
            },
            "required": ["symbol"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::Candle;
    use crate::store::MarketDataStore;
    use crate::tools::share;
    use chrono::DateTime;

    fn store_with_closes(closes: &[f64]) -> SharedStore {
        let mut store = MarketDataStore::new("XAUUSD");
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let time =
                    DateTime::from_timestamp(1_760_000_000 + i as i64 * 300, 0).expect("valid ts");
                Candle::new(time, close, close + 0.5, close - 0.5, close)
            })
            .collect();
        store.merge(candles);
        share(store)
    }

    #[tokio::test]
    async fn test_short_history_flags_insufficient_data() {
        let closes: Vec<f64> = (0..10).map(|i| 2000.0 + f64::from(i)).collect();
        let tool = TechnicalPatternsTool::new(store_with_closes(&closes));

        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        assert_eq!(value["insufficientData"], json!(true));
        assert!(value.get("indicators").is_none());
    }

    #[tokio::test]
    async fn test_uptrend_detected_on_rising_series() {
        let closes: Vec<f64> = (0..120).map(|i| 2000.0 + f64::from(i) * 0.8).collect();
        let tool = TechnicalPatternsTool::new(store_with_closes(&closes));

        let value = tool
            .execute(json!({"symbol": "XAUUSD", "primaryTimeframe": "4h"}))
            .await
            .unwrap();

        assert!(value.get("insufficientData").is_none());
        let names: Vec<&str> = value["patterns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Uptrend Channel"));

        let indicators = &value["indicators"];
        assert!(indicators["macd"].as_f64().unwrap() > 0.0);
        assert!(
            indicators["movingAverage20"].as_f64().unwrap()
                > indicators["movingAverage50"].as_f64().unwrap()
        );
    }

    #[tokio::test]
    async fn test_downtrend_and_oversold() {
        let closes: Vec<f64> = (0..120).map(|i| 2100.0 - f64::from(i) * 0.8).collect();
        let tool = TechnicalPatternsTool::new(store_with_closes(&closes));

        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        let names: Vec<&str> = value["patterns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Downtrend Channel"));
        assert!(names.contains(&"Oversold Reversal Zone"));
    }

    #[test]
    fn test_flat_series_reads_as_consolidation() {
        let patterns = derive_patterns(50.0, 0.01, 2000.0, 2000.0, 2000.0, "1d");
        let names: Vec<&str> = patterns.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Consolidation"]);
    }
}
