//! Market tool provider for auric
//!
//! This crate supplies the numeric side of the prediction engine:
//!
//! - [`store`]: an in-memory store of 5-minute OHLC bars parsed from CSV
//!   folders, deduplicated and sorted, with range and timeframe aggregation
//! - [`indicators`]: SMA/EMA/RSI/MACD/ATR (via the `ta` crate), return
//!   volatility, and swing-level detection
//! - [`tools`]: six registry-ready tools over one shared store, covering
//!   data collection, pattern analysis, sentiment scoring, level detection,
//!   timeframe comparison, and regime classification
//!
//! Everything is deterministic given store contents; degraded conditions are
//! reported inside tool payloads so the orchestrator can react to them.

pub mod candle;
pub mod error;
pub mod indicators;
pub mod store;
pub mod tools;

// Re-export main types for convenience
pub use candle::{Candle, Timeframe};
pub use error::{MarketError, Result};
pub use store::{MarketDataStore, OhlcAggregate, StatsSummary};
pub use tools::{
    MarketDataTool, MarketRegimeTool, NewsSentimentTool, SharedStore, SupportResistanceTool,
    TechnicalPatternsTool, TimeframeCompareTool, default_tools, share,
};
