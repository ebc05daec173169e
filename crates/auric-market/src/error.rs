//! Error types for the market data provider

use auric_tools::ToolError;
use thiserror::Error;

/// Market provider specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Filesystem problem while loading candle CSVs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A timeframe string that no bucket size maps to
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Not enough bars loaded for the requested computation
    #[error("insufficient history: need {needed} bars, have {have}")]
    InsufficientData { needed: usize, have: usize },

    /// Technical indicator calculation error
    #[error("indicator error: {0}")]
    Indicator(String),

    /// Malformed tool parameters
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<MarketError> for ToolError {
    fn from(err: MarketError) -> Self {
        ToolError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InsufficientData {
            needed: 50,
            have: 12,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history: need 50 bars, have 12"
        );

        let err = MarketError::InvalidTimeframe("2h".to_string());
        assert_eq!(err.to_string(), "invalid timeframe: 2h");
    }

    #[test]
    fn test_conversion_to_tool_error() {
        let err: ToolError = MarketError::Indicator("period must be > 0".to_string()).into();
        assert!(err.message().contains("indicator error"));
    }
}
