//! Tool for detecting support and resistance levels

use async_trait::async_trait;
use auric_core::results::SupportResistanceResult;
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;
use crate::indicators;

/// Window of recent bars scanned for swing points
const SCAN_BARS: usize = 288;

const MAX_LEVELS: usize = 3;

/// Tool for identifying key support and resistance levels
pub struct SupportResistanceTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupportResistanceParams {
    symbol: String,
    /// Swing-point neighborhood half-width in bars; larger is stricter
    #[serde(default = "default_sensitivity")]
    sensitivity: usize,
}

fn default_sensitivity() -> usize {
    5
}

impl SupportResistanceTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn detect(&self, params: SupportResistanceParams) -> SupportResistanceResult {
        let store = self.store.read().await;
        let window = params.sensitivity.clamp(2, 20);
        let levels = indicators::swing_levels(store.last_n(SCAN_BARS), window, MAX_LEVELS);

        let total = levels.support.len() + levels.resistance.len();
        let confidence = if total == 0 {
            0.0
        } else {
            (0.5 + 0.05 * total as f64).min(0.85)
        };

        SupportResistanceResult {
            symbol: params.symbol,
            support: levels.support,
            resistance: levels.resistance,
            confidence,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl Tool for SupportResistanceTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: SupportResistanceParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.detect(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "detect_support_resistance"
    }

    fn description(&self) -> &str {
        "Identify key support and resistance levels from recent swing points."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Instrument symbol"
                },
                "sensitivity": {
                    "type": "integer",
                    "description": "Swing-point neighborhood half-width in bars",
                    "default": 5
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
    async fn test_empty_store_yields_no_levels() {
        let tool = SupportResistanceTool::new(share(MarketDataStore::new("XAUUSD")));
        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();

        assert_eq!(value["support"].as_array().unwrap().len(), 0);
        assert_eq!(value["resistance"].as_array().unwrap().len(), 0);
        assert_eq!(value["confidence"], json!(0.0));
    }

    #[tokio::test]
    async fn test_oscillating_series_brackets_price() {
        // Waves around 2000 ending mid-range
        let closes: Vec<f64> = (0..120)
            .map(|i| 2000.0 + 10.0 * (f64::from(i) * 0.2).sin())
            .collect();
        let tool = SupportResistanceTool::new(store_with_closes(&closes));

        let value = tool
            .execute(json!({"symbol": "XAUUSD", "sensitivity": 3}))
            .await
            .unwrap();

        let last_close = closes[closes.len() - 1];
        let support = value["support"].as_array().unwrap();
        let resistance = value["resistance"].as_array().unwrap();

        assert!(!support.is_empty());
        assert!(!resistance.is_empty());
        assert!(support.iter().all(|s| s.as_f64().unwrap() < last_close));
        assert!(resistance.iter().all(|r| r.as_f64().unwrap() > last_close));
        assert!(value["confidence"].as_f64().unwrap() > 0.5);
    }
}
