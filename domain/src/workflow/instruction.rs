//! Action instruction — the unit of decision output.
//!
//! Every step of a run the mediator returns one [`ActionInstruction`]:
//! either `call_tool` (with a tool name and verbatim arguments) or `done`
//! (with a free-text reason). Instructions are constructed fresh each step
//! and immutable once returned.
//!
//! Mediators backed by a language model hand back raw JSON; the orchestrator
//! validates it with [`ActionInstruction::from_value`], which is strict:
//! unknown fields and unknown `action` values are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The two actions a mediator can decide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Dispatch the named tool with the given arguments
    CallTool,
    /// Terminate the run successfully
    Done,
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::CallTool => "call_tool",
            Action::Done => "done",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised when a raw mediator decision fails schema validation
#[derive(Error, Debug)]
pub enum InstructionError {
    #[error("invalid_instruction: {0}")]
    InvalidSchema(String),

    #[error("invalid_instruction: decision is not a JSON object")]
    NotAnObject,
}

/// A single validated decision returned by the mediator.
///
/// Schema (as emitted by model-backed mediators):
///
/// ```json
/// {"action": "call_tool", "tool": "research", "args": {"field": "AI"}}
/// ```
/// or
/// ```json
/// {"action": "done", "reason": "post scheduled"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionInstruction {
    /// What to do this step
    pub action: Action,
    /// Tool to invoke; required when `action` is `call_tool`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Arguments passed verbatim to the tool (the tool validates its own inputs)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
    /// Free-text completion reason; present when `action` is `done`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ActionInstruction {
    /// A `call_tool` instruction for the named tool
    pub fn call_tool(tool: impl Into<String>) -> Self {
        Self {
            action: Action::CallTool,
            tool: Some(tool.into()),
            args: Map::new(),
            reason: None,
        }
    }

    /// A `done` instruction with a completion reason
    pub fn done(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Done,
            tool: None,
            args: Map::new(),
            reason: Some(reason.into()),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }

    pub fn is_done(&self) -> bool {
        self.action == Action::Done
    }

    /// Strictly validate a raw JSON decision into a typed instruction.
    ///
    /// Unknown fields, missing `action`, and unrecognized `action` values are
    /// all rejected. A malformed decision is unrecoverable for the run, so
    /// callers record the error and terminate rather than skipping the step.
    pub fn from_value(value: Value) -> Result<Self, InstructionError> {
        if !value.is_object() {
            return Err(InstructionError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|e| InstructionError::InvalidSchema(e.to_string()))
    }
}

/// Extract the instruction JSON object from model response text.
///
/// Supports two formats, in order:
/// 1. ` ```json` (or bare ` ``` `) fenced code blocks containing an object
/// 2. Raw JSON — the entire response is a valid object
///
/// Returns the raw [`Value`] so the caller can run it through the same strict
/// [`ActionInstruction::from_value`] validation as any other raw decision.
pub fn extract_instruction_json(response: &str) -> Option<Value> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<Value>(&current_block)
                && parsed.is_object()
            {
                return Some(parsed);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    // Try the entire response as JSON
    match serde_json::from_str::<Value>(response.trim()) {
        Ok(parsed) if parsed.is_object() => Some(parsed),
        _ => None,
    }
}
