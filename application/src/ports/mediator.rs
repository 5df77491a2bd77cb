//! Mediator port
//!
//! The decision-making seam of the orchestrator. A mediator is shown the
//! current run context and the metadata of the registered tools, and returns
//! one decision per step. The strategy is entirely the mediator's own: a
//! fixed script, a rule table, or model inference.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use postpilot_domain::{ActionInstruction, RunContext, ToolMetadata};

/// Errors a mediator can raise while deciding
#[derive(Error, Debug)]
pub enum MediatorError {
    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("no decision in model response: {0}")]
    NoDecision(String),

    #[error("{0}")]
    Other(String),
}

/// One decision, either already typed or a raw JSON value.
///
/// Model-backed mediators hand back the raw value they extracted so the
/// orchestrator applies the same strict schema validation to every source of
/// decisions. Rule-based mediators construct instructions directly.
#[derive(Debug, Clone)]
pub enum Decision {
    Instruction(ActionInstruction),
    Raw(Value),
}

impl From<ActionInstruction> for Decision {
    fn from(instruction: ActionInstruction) -> Self {
        Decision::Instruction(instruction)
    }
}

impl From<Value> for Decision {
    fn from(value: Value) -> Self {
        Decision::Raw(value)
    }
}

/// Pluggable decision-maker driving the orchestrator's step loop.
///
/// `tools` is built once per run from the registry (the tool set is static
/// for a run) and handed to every `decide` call. Implementations must never
/// mutate the context; it is theirs to read only.
#[async_trait]
pub trait Mediator: Send + Sync {
    async fn decide(
        &self,
        context: &RunContext,
        tools: &[ToolMetadata],
    ) -> Result<Decision, MediatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decision_from_instruction() {
        let decision: Decision = ActionInstruction::done("finished").into();
        assert!(matches!(decision, Decision::Instruction(ref i) if i.is_done()));
    }

    #[test]
    fn test_decision_from_raw_value() {
        let decision: Decision = json!({"action": "done"}).into();
        assert!(matches!(decision, Decision::Raw(_)));
    }
}
