//! Tool for comparing directional bias across timeframes

use async_trait::async_trait;
use auric_core::results::TimeframeAlignment;
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;
use crate::candle::Timeframe;
use crate::indicators;

/// Aggregated bars requested per timeframe; EMA20 needs at least 21
const BARS_PER_TIMEFRAME: usize = 60;

/// Tool for cross-timeframe bias comparison
pub struct TimeframeCompareTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareParams {
    symbol: String,
    #[serde(default = "default_timeframes")]
    timeframes: Vec<String>,
}

fn default_timeframes() -> Vec<String> {
    vec!["1h".to_string(), "4h".to_string(), "1d".to_string()]
}

impl TimeframeCompareTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn compare(&self, params: CompareParams) -> TimeframeAlignment {
        let store = self.store.read().await;

        let mut biases: Vec<(String, &'static str)> = Vec::new();
        let mut conflicts = Vec::new();

        for requested in &params.timeframes {
            let Ok(timeframe) = requested.parse::<Timeframe>() else {
                conflicts.push(format!("unknown timeframe {requested} ignored"));
                continue;
            };

            let bars = store.aggregate(timeframe, BARS_PER_TIMEFRAME);
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            match (indicators::ema(&closes, 20), closes.last()) {
                (Some(ema20), Some(&last)) => {
                    let bias = if last > ema20 { "bullish" } else { "bearish" };
                    biases.push((timeframe.as_str().to_string(), bias));
                }
                _ => {
                    conflicts.push(format!("insufficient {timeframe} history for a bias read"));
                }
            }
        }

        if biases.is_empty() {
            return TimeframeAlignment {
                symbol: params.symbol,
                alignment: "unknown".to_string(),
                conflicts,
                overall_bias: "neutral".to_string(),
                timestamp: Utc::now(),
            };
        }

        let bullish = biases.iter().filter(|(_, b)| *b == "bullish").count();
        let bearish = biases.len() - bullish;
        let (overall, majority) = match bullish.cmp(&bearish) {
            std::cmp::Ordering::Greater => ("bullish", bullish),
            std::cmp::Ordering::Less => ("bearish", bearish),
            std::cmp::Ordering::Equal => ("balanced", bullish),
        };

        let alignment = if majority == biases.len() {
            "aligned"
        } else if majority * 2 > biases.len() {
            "mostly_aligned"
        } else {
            "mixed"
        };

        for (timeframe, bias) in &biases {
            if overall != "balanced" && *bias != overall {
                conflicts.push(format!("{timeframe} shows {bias} against {overall} majority"));
            }
        }

        TimeframeAlignment {
            symbol: params.symbol,
            alignment: alignment.to_string(),
            conflicts,
            overall_bias: overall.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl Tool for TimeframeCompareTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: CompareParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.compare(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "compare_timeframes"
    }

    fn description(&self) -> &str {
        "Compare directional bias across timeframes and report their alignment."
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
                    "description": "Timeframes to compare",
                    "default": ["1h", "4h", "1d"]
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

    fn store_with_trend(count: usize, slope: f64) -> SharedStore {
        let mut store = MarketDataStore::new("XAUUSD");
        let candles: Vec<Candle> = (0..count)
            .map(|i| {
                let time =
                    DateTime::from_timestamp(1_760_000_000 + i as i64 * 300, 0).expect("valid ts");
                let close = 2000.0 + i as f64 * slope;
                Candle::new(time, close, close + 0.3, close - 0.3, close)
            })
            .collect();
        store.merge(candles);
        share(store)
    }

    #[tokio::test]
    async fn test_rising_market_aligned_bullish() {
        // ~3 days of bars so 1h has plenty of buckets
        let tool = TimeframeCompareTool::new(store_with_trend(864, 0.05));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["1h", "4h"]}))
            .await
            .unwrap();

        assert_eq!(value["overallBias"], json!("bullish"));
        assert_eq!(value["alignment"], json!("aligned"));
        assert_eq!(value["conflicts"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_store_reports_unknown() {
        let tool = TimeframeCompareTool::new(share(MarketDataStore::new("XAUUSD")));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["1h"]}))
            .await
            .unwrap();

        assert_eq!(value["alignment"], json!("unknown"));
        assert_eq!(value["overallBias"], json!("neutral"));
        assert!(!value["conflicts"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_timeframe_is_reported_not_fatal() {
        let tool = TimeframeCompareTool::new(store_with_trend(864, 0.05));
        let value = tool
            .execute(json!({"symbol": "XAUUSD", "timeframes": ["2h", "1h"]}))
            .await
            .unwrap();

        let conflicts = value["conflicts"].as_array().unwrap();
        assert!(
            conflicts
                .iter()
                .any(|c| c.as_str().unwrap().contains("unknown timeframe 2h"))
        );
        assert_eq!(value["overallBias"], json!("bullish"));
    }
}
