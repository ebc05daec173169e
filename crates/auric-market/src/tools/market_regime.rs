//! Tool for classifying the prevailing market regime

use async_trait::async_trait;
use auric_core::results::MarketRegimeResult;
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;
use crate::indicators;

/// Bars of history required before a regime call (MA50 warm-up + 1)
const MIN_BARS: usize = 51;

/// Volatility window: ~8 hours of 5-minute bars
const VOLATILITY_BARS: usize = 96;

/// Trend strength above which the market counts as trending
const TREND_THRESHOLD: f64 = 0.3;

/// Tool for determining the current market regime
pub struct MarketRegimeTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegimeParams {
    symbol: String,
    #[serde(default = "default_primary_timeframe")]
    primary_timeframe: String,
}

fn default_primary_timeframe() -> String {
    "1d".to_string()
}

impl MarketRegimeTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn assess(&self, params: RegimeParams) -> MarketRegimeResult {
        let store = self.store.read().await;
        let closes = store.closes();

        let (Some(ma20), Some(ma50)) = (
            indicators::sma(&closes, 20),
            indicators::sma(&closes, 50),
        ) else {
            return MarketRegimeResult {
                symbol: params.symbol,
                regime: "undetermined".to_string(),
                volatility: "unknown".to_string(),
                trend_strength: 0.0,
                timestamp: Utc::now(),
            };
        };
        if closes.len() < MIN_BARS || ma50 == 0.0 {
            return MarketRegimeResult {
                symbol: params.symbol,
                regime: "undetermined".to_string(),
                volatility: "unknown".to_string(),
                trend_strength: 0.0,
                timestamp: Utc::now(),
            };
        }

        let divergence = (ma20 - ma50) / ma50;
        let trend_strength = (divergence.abs() * 100.0).min(1.0);
        let regime = if trend_strength >= TREND_THRESHOLD {
            if divergence > 0.0 {
                "trending_bullish"
            } else {
                "trending_bearish"
            }
        } else {
            "ranging"
        };

        let volatility = match indicators::volatility(&closes, VOLATILITY_BARS) {
            Some(vol) if vol.annualized < 0.12 => "low",
            Some(vol) if vol.annualized < 0.25 => "medium",
            Some(_) => "high",
            None => "unknown",
        };

        tracing::debug!(
            symbol = %params.symbol,
            primary_timeframe = %params.primary_timeframe,
            regime,
            trend_strength,
            "market regime assessed"
        );

        MarketRegimeResult {
            symbol: params.symbol,
            regime: regime.to_string(),
            volatility: volatility.to_string(),
            trend_strength,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl Tool for MarketRegimeTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: RegimeParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.assess(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "assess_market_regime"
    }

    fn description(&self) -> &str {
        "Classify the current market regime (trending or ranging), its \
         volatility band, and trend strength."
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
                    "description": "Timeframe context for the assessment",
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
                Candle::new(time, close, close + 0.2, close - 0.2, close)
            })
            .collect();
        store.merge(candles);
        share(store)
    }

    #[tokio::test]
    async fn test_short_history_is_undetermined() {
        let closes: Vec<f64> = (0..20).map(|i| 2000.0 + f64::from(i)).collect();
        let tool = MarketRegimeTool::new(store_with_closes(&closes));

        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        assert_eq!(value["regime"], json!("undetermined"));
        assert_eq!(value["volatility"], json!("unknown"));
        assert_eq!(value["trendStrength"], json!(0.0));
    }

    #[tokio::test]
    async fn test_strong_rally_is_trending_bullish() {
        // Steep rise: MA20 pulls far above MA50
        let closes: Vec<f64> = (0..120).map(|i| 2000.0 + f64::from(i) * 2.0).collect();
        let tool = MarketRegimeTool::new(store_with_closes(&closes));

        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        assert_eq!(value["regime"], json!("trending_bullish"));
        assert!(value["trendStrength"].as_f64().unwrap() >= TREND_THRESHOLD);
    }

    #[tokio::test]
    async fn test_flat_series_is_ranging_low_vol() {
        let closes = vec![2000.0; 120];
        let tool = MarketRegimeTool::new(store_with_closes(&closes));

        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        assert_eq!(value["regime"], json!("ranging"));
        assert_eq!(value["volatility"], json!("low"));
        assert_eq!(value["trendStrength"], json!(0.0));
    }
}
