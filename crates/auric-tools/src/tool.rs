//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error returned by a tool's execute call.
///
/// Tools report conditions they can detect internally (missing data, bad
/// periods) inside their result payload rather than through this error; an
/// `Err` here means the tool genuinely could not produce a payload. The
/// orchestrator catches it, tags it with the tool name, and degrades the step
/// to a fallback fact.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for tool executions
pub type ToolResult = std::result::Result<Value, ToolError>;

/// Executable contract for one registered capability
///
/// Each tool exposes a unique name, a human-readable description, and a JSON
/// Schema for its input. Parameters arrive as a JSON value already enriched
/// with run-scoped context (subject symbol, invocation timestamp).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match input_schema)
    ///
    /// # Returns
    ///
    /// Tool output as JSON value
    async fn execute(&self, params: Value) -> ToolResult;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;
}
