//! Tool for sentiment scoring
//!
//! No news feed is wired into this build, so the score is a deterministic
//! price-momentum proxy: recent percentage change mapped into [0, 1] around a
//! 0.5 neutral midpoint. The payload names the method so downstream consumers
//! can tell proxy sentiment from feed-driven sentiment.

use async_trait::async_trait;
use auric_core::results::NewsSentimentResult;
use auric_tools::{Tool, ToolError, ToolResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::SharedStore;

/// 5-minute bars per hour of lookback
const BARS_PER_HOUR: u64 = 12;

/// Scale mapping fractional price change onto the sentiment interval;
/// a 1% move saturates 0.2 of the scale
const MOMENTUM_SCALE: f64 = 20.0;

const METHOD: &str = "price_momentum_proxy";

/// Tool for estimating market sentiment for a symbol
pub struct NewsSentimentTool {
    store: SharedStore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentParams {
    symbol: String,
    #[serde(default = "default_lookback_hours")]
    lookback_hours: u64,
}

fn default_lookback_hours() -> u64 {
    24
}

impl NewsSentimentTool {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn score(&self, params: SentimentParams) -> NewsSentimentResult {
        let store = self.store.read().await;
        let bars = (params.lookback_hours.saturating_mul(BARS_PER_HOUR)) as usize;
        let window = store.last_n(bars + 1);

        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return NewsSentimentResult {
                symbol: params.symbol,
                lookback_hours: params.lookback_hours,
                articles: Vec::new(),
                overall_sentiment: 0.5,
                method: METHOD.to_string(),
                insufficient_data: true,
                timestamp: Utc::now(),
            };
        };
        if window.len() < 2 || first.close == 0.0 {
            return NewsSentimentResult {
                symbol: params.symbol,
                lookback_hours: params.lookback_hours,
                articles: Vec::new(),
                overall_sentiment: 0.5,
                method: METHOD.to_string(),
                insufficient_data: true,
                timestamp: Utc::now(),
            };
        }

        let change = (last.close - first.close) / first.close;
        let overall_sentiment = (0.5 + change * MOMENTUM_SCALE).clamp(0.0, 1.0);

        NewsSentimentResult {
            symbol: params.symbol,
            lookback_hours: params.lookback_hours,
            articles: Vec::new(),
            overall_sentiment,
            method: METHOD.to_string(),
            insufficient_data: false,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl Tool for NewsSentimentTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let params: SentimentParams = serde_json::from_value(params)
            .map_err(|e| ToolError::new(format!("invalid parameters: {e}")))?;

        let result = self.score(params).await;
        serde_json::to_value(result).map_err(|e| ToolError::new(e.to_string()))
    }

    fn name(&self) -> &str {
        "get_news_sentiment"
    }

    fn description(&self) -> &str {
        "Estimate market sentiment for a symbol over a lookback window. \
         Scores sit in [0, 1] with 0.5 neutral."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Instrument symbol"
                },
                "lookbackHours": {
                    "type": "integer",
                    "description": "Hours of history to score",
                    "default": 24
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
    async fn test_empty_store_is_neutral_and_insufficient() {
        let tool = NewsSentimentTool::new(share(MarketDataStore::new("XAUUSD")));
        let value = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();

        assert_eq!(value["overallSentiment"], json!(0.5));
        assert_eq!(value["insufficientData"], json!(true));
        assert_eq!(value["method"], json!("price_momentum_proxy"));
    }

    #[tokio::test]
    async fn test_rising_prices_score_bullish() {
        let closes: Vec<f64> = (0..60).map(|i| 2000.0 + f64::from(i)).collect();
        let tool = NewsSentimentTool::new(store_with_closes(&closes));

        let value = tool
            .execute(json!({"symbol": "XAUUSD", "lookbackHours": 4}))
            .await
            .unwrap();

        let sentiment = value["overallSentiment"].as_f64().unwrap();
        assert!(sentiment > 0.5, "got {sentiment}");
        assert!(sentiment <= 1.0);
        assert_eq!(value["lookbackHours"], json!(4));
    }

    #[tokio::test]
    async fn test_falling_prices_score_bearish_and_clamp() {
        let closes: Vec<f64> = (0..60).map(|i| 2100.0 - f64::from(i) * 10.0).collect();
        let tool = NewsSentimentTool::new(store_with_closes(&closes));

        let value = tool
            .execute(json!({"symbol": "XAUUSD", "lookbackHours": 4}))
            .await
            .unwrap();

        let sentiment = value["overallSentiment"].as_f64().unwrap();
        assert_eq!(sentiment, 0.0); // deep sell-off clamps at the floor
    }

    #[tokio::test]
    async fn test_deterministic_given_same_store() {
        let closes: Vec<f64> = (0..40).map(|i| 2000.0 + f64::from(i % 7)).collect();
        let tool = NewsSentimentTool::new(store_with_closes(&closes));

        let a = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        let b = tool.execute(json!({"symbol": "XAUUSD"})).await.unwrap();
        assert_eq!(a["overallSentiment"], b["overallSentiment"]);
    }
}
