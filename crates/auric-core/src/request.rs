//! Run input types and validation

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Analysis strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Comprehensive,
    Technical,
    Sentiment,
    Momentum,
}

impl Strategy {
    /// Label reported as `analysisStrategy` in run metadata
    pub fn metadata_label(self) -> &'static str {
        match self {
            Self::Comprehensive => "multi_timeframe_technical_sentiment",
            Self::Technical => "technical_structure",
            Self::Sentiment => "sentiment_driven",
            Self::Momentum => "momentum_alignment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

/// Caller's preferred reporting horizons
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimePreference {
    #[serde(rename = "macro", skip_serializing_if = "Option::is_none")]
    pub macro_horizon: Option<String>,
    #[serde(rename = "micro", skip_serializing_if = "Option::is_none")]
    pub micro_horizon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_preference: Option<TimePreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<RiskTolerance>,
}

/// Input to a single analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// Instrument identifier, 1 to 10 characters
    pub symbol: String,
    #[serde(default)]
    pub preferences: Preferences,
}

impl PredictionRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            preferences: Preferences::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.preferences.strategy = Some(strategy);
        self
    }

    pub fn with_risk_tolerance(mut self, risk: RiskTolerance) -> Self {
        self.preferences.risk_tolerance = Some(risk);
        self
    }

    /// Effective strategy, defaulting to comprehensive
    pub fn strategy(&self) -> Strategy {
        self.preferences.strategy.unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        let len = self.symbol.chars().count();
        if len == 0 || len > 10 {
            return Err(AgentError::Internal(format!(
                "invalid subject '{}': symbol must be 1-10 characters",
                self.symbol
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_length_bounds() {
        assert!(PredictionRequest::new("XAUUSD").validate().is_ok());
        assert!(PredictionRequest::new("X").validate().is_ok());
        assert!(PredictionRequest::new("ABCDEFGHIJ").validate().is_ok());
        assert!(PredictionRequest::new("").validate().is_err());
        assert!(PredictionRequest::new("ABCDEFGHIJK").validate().is_err());
    }

    #[test]
    fn test_default_strategy_is_comprehensive() {
        let request = PredictionRequest::new("XAUUSD");
        assert_eq!(request.strategy(), Strategy::Comprehensive);

        let request = request.with_strategy(Strategy::Momentum);
        assert_eq!(request.strategy(), Strategy::Momentum);
    }

    #[test]
    fn test_request_deserializes_wire_shape() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{
                "symbol": "XAUUSD",
                "preferences": {
                    "strategy": "technical",
                    "timePreference": {"macro": "2_weeks", "micro": "3_days"},
                    "riskTolerance": "low"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(request.preferences.strategy, Some(Strategy::Technical));
        assert_eq!(
            request.preferences.risk_tolerance,
            Some(RiskTolerance::Low)
        );
        let horizons = request.preferences.time_preference.unwrap();
        assert_eq!(horizons.macro_horizon.as_deref(), Some("2_weeks"));
        assert_eq!(horizons.micro_horizon.as_deref(), Some("3_days"));
    }

    #[test]
    fn test_strategy_metadata_labels() {
        assert_eq!(
            Strategy::Comprehensive.metadata_label(),
            "multi_timeframe_technical_sentiment"
        );
        assert_eq!(Strategy::Momentum.metadata_label(), "momentum_alignment");
    }
}
