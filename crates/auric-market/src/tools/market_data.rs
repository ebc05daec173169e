//! Tool for collecting OHLC market data across timeframes

use async_trait::async_trait;
use auric_core::results::{AggregatedBar, MarketDataResult};
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;
use crate::candle::Timeframe;

/// Tool for fetching aggregated OHLC bars from the candle store
pub struct MarketDataTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketDataParams {
    symbol: String,
    #[serde(default = "default_timeframes")]
    timeframes: Vec<String>,
    #[serde(default = "default_limit")]
    limit: usize,
    /// Recovery mode: raw recent 5-minute bars instead of aggregates
    #[serde(default)]
    basic: bool,
}

fn default_timeframes() -> Vec<String> {
    vec!["1h".to_string(), "4h".to_string(), "1d".to_string()]
}

fn default_limit() -> usize {
    20
}

impl MarketDataTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn collect(&self, params: MarketDataParams) -> MarketDataResult {
        let store = self.store.read().await;

        if params.basic {
            let data: Vec<AggregatedBar> = store
                .last_n(params.limit)
                .iter()
                .map(|candle| AggregatedBar {
                    timeframe: Timeframe::M5.as_str().to_string(),
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                    change_pct: candle.change_pct,
                })
                .collect();

            return MarketDataResult {
                symbol: params.symbol,
                timeframes: vec![Timeframe::M5.as_str().to_string()],
                data,
                timestamp: Utc::now(),
            };
        }

        let mut used = Vec::new();
        let mut data = Vec::new();
        for requested in &params.timeframes {
            match requested.parse::<Timeframe>() {
                Ok(timeframe) => {
                    data.extend(store.aggregate(timeframe, params.limit));
                    used.push(timeframe.as_str().to_string());
                }
                Err(err) => {
                    tracing::warn!(timeframe = %requested, %err, "skipping unknown timeframe");
                }
            }
        }

        MarketDataResult {
            symbol: params.symbol,
            timeframes: used,
            data,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl Tool for MarketDataTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: MarketDataParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.collect(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "get_market_data"
    }

    fn description(&self) -> &str {
        "Fetch OHLC market data for a symbol, aggregated across the requested timeframes."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Instrument symbol"
                },
                "timeframes": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["5m", "1h", "4h", "1d", "1w"] },
                    "description": "Timeframes to aggregate",
                    "default": ["1h", "4h", "1d"]
                },
                "limit": {
                    "type": "integer",
                    "description": "Bars to return per timeframe",
                    "default": 20
                },
                "basic": {
                    "type": "boolean",
                    "description": "Return raw recent 5-minute bars instead of aggregates",
                    "default": false
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

    fn seeded_store(count: usize) -> SharedStore {
        let mut store = MarketDataStore::new("XAUUSD");
        let candles: Vec<Candle> = (0..count)
            .map(|i| {
                let time =
                    DateTime::from_timestamp(1_760_000_000 + i as i64 * 300, 0).expect("valid ts");
                let close = 2000.0 + i as f64 * 0.1;
                Candle::new(time, close - 0.1, close + 0.3, close - 0.3, close)
            })
            .collect();
        store.merge(candles);
        share(store)
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_data() {
        let tool = MarketDataTool::new(share(MarketDataStore::new("XAUUSD")));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["1h"]}))
            .await
            .unwrap();

        assert_eq!(value["data"].as_array().unwrap().len(), 0);
        assert_eq!(value["symbol"], "XAUUSD");
    }

    #[tokio::test]
    async fn test_aggregated_collection() {
        let tool = MarketDataTool::new(seeded_store(48)); // 4 hours of bars
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["1h", "4h"], "limit": 10}))
            .await
            .unwrap();

        let data = value["data"].as_array().unwrap();
        assert!(!data.is_empty());
        let timeframes: Vec<&str> = data
            .iter()
            .map(|bar| bar["timeframe"].as_str().unwrap())
            .collect();
        assert!(timeframes.contains(&"1h"));
        assert!(timeframes.contains(&"4h"));
    }

    #[tokio::test]
    async fn test_basic_mode_returns_raw_bars() {
        let tool = MarketDataTool::new(seeded_store(30));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "basic": true, "limit": 5}))
            .await
            .unwrap();

        let data = value["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        assert!(data.iter().all(|bar| bar["timeframe"] == "5m"));
        assert_eq!(value["timeframes"], json!(["5m"]));
    }

    #[tokio::test]
    async fn test_unknown_timeframes_are_skipped() {
        let tool = MarketDataTool::new(seeded_store(24));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["2h", "1h"]}))
            .await
            .unwrap();

        assert_eq!(value["timeframes"], json!(["1h"]));
    }

    #[tokio::test]
    async fn test_rejects_malformed_params() {
        let tool = MarketDataTool::new(seeded_store(10));
        let err = tool.execute(json!({"limit": 5})).await.unwrap_err();
        assert!(err.message().contains("invalid parameters"));
    }
}
