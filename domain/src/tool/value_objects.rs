//! Tool value objects — immutable error and output types.
//!
//! Error codes are for logging and diagnostics only; the orchestrator treats
//! every tool-raised error the same way (record, continue the run).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error raised by a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "INVALID_ARGUMENT", "UPSTREAM_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Missing or malformed arguments — the tool validates its own inputs
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    /// An upstream dependency (API, model) failed
    pub fn upstream_failed(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_FAILED", message)
    }

    /// The tool itself failed mid-execution
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// One entry of the run context's `tool_outputs` sequence: the raw result a
/// tool produced, keyed by the tool's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool: String,
    pub result: Value,
}

impl ToolOutput {
    pub fn new(tool: impl Into<String>, result: Value) -> Self {
        Self {
            tool: tool.into(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::invalid_argument("Missing required argument: user_id");
        assert_eq!(err.to_string(), "[INVALID_ARGUMENT] Missing required argument: user_id");
    }

    #[test]
    fn test_tool_output() {
        let out = ToolOutput::new("research", json!({"trends": []}));
        assert_eq!(out.tool, "research");
        assert_eq!(out.result["trends"], json!([]));
    }
}
