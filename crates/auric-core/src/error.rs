//! Error taxonomy for analysis runs

use thiserror::Error;

/// Result type alias for auric-core
pub type Result<T> = std::result::Result<T, AgentError>;

/// Closed set of run-level fault kinds.
///
/// Step-local faults (`ToolResolution`, `ToolExecution`) are absorbed by the
/// orchestrator and recorded as fallback facts; the remaining kinds abort the
/// run into the fallback prediction. None of them ever crosses the `run`
/// boundary as an `Err`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A planned tool name did not resolve in the registry
    #[error("tool '{tool}' is not registered")]
    ToolResolution { tool: String },

    /// A resolved tool returned an error from its execute call
    #[error("tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// The plan proposer failed or produced a malformed plan
    #[error("plan formulation failed: {0}")]
    PlanFormulation(String),

    /// The synthesizer failed to fold memory into a prediction
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Anything else, including deadline overruns between steps
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Short machine-readable label for logs and telemetry
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolResolution { .. } => "tool_resolution",
            Self::ToolExecution { .. } => "tool_execution",
            Self::PlanFormulation(_) => "plan_formulation",
            Self::Synthesis(_) => "synthesis",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::ToolResolution {
            tool: "get_market_data".to_string(),
        };
        assert_eq!(err.to_string(), "tool 'get_market_data' is not registered");

        let err = AgentError::ToolExecution {
            tool: "get_news_sentiment".to_string(),
            message: "store empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tool 'get_news_sentiment' failed: store empty"
        );
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(
            AgentError::PlanFormulation("no steps".into()).kind(),
            "plan_formulation"
        );
        assert_eq!(AgentError::Synthesis("bad fact".into()).kind(), "synthesis");
        assert_eq!(AgentError::Internal("deadline".into()).kind(), "internal");
    }
}
