//! Built-in market analysis tools
//!
//! Every tool reads the shared candle store and produces one of the typed
//! result shapes from `auric-core`. Tools are deterministic given store
//! contents; degraded conditions (no candles, short history) surface inside
//! the payload (`data: []`, `insufficientData: true`) rather than as errors.

pub mod market_data;
pub mod market_regime;
pub mod news_sentiment;
pub mod support_resistance;
pub mod technical_patterns;
pub mod timeframe_compare;

pub use market_data::MarketDataTool;
pub use market_regime::MarketRegimeTool;
pub use news_sentiment::NewsSentimentTool;
pub use support_resistance::SupportResistanceTool;
pub use technical_patterns::TechnicalPatternsTool;
pub use timeframe_compare::TimeframeCompareTool;

use crate::store::MarketDataStore;
use auric_tools::Tool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Candle store handle shared by every tool and the loader
pub type SharedStore = Arc<RwLock<MarketDataStore>>;

/// Wrap a store for sharing across tools
pub fn share(store: MarketDataStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

/// The full built-in tool set over one store
pub fn default_tools(store: &SharedStore) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(MarketDataTool::new(Arc::clone(store))),
        Arc::new(TechnicalPatternsTool::new(Arc::clone(store))),
        Arc::new(NewsSentimentTool::new(Arc::clone(store))),
        Arc::new(SupportResistanceTool::new(Arc::clone(store))),
        Arc::new(TimeframeCompareTool::new(Arc::clone(store))),
        Arc::new(MarketRegimeTool::new(Arc::clone(store))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_set_names() {
        let store = share(MarketDataStore::new("XAUUSD"));
        let tools = default_tools(&store);
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();

        assert_eq!(tools.len(), 6);
        assert!(names.contains(&"get_market_data"));
        assert!(names.contains(&"analyze_technical_patterns"));
        assert!(names.contains(&"get_news_sentiment"));
        assert!(names.contains(&"detect_support_resistance"));
        assert!(names.contains(&"compare_timeframes"));
        assert!(names.contains(&"assess_market_regime"));
    }
}
