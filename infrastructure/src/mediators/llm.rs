//! Model-backed mediator.
//!
//! Serializes the run context into the decide prompt, asks the chat gateway
//! for the next action, and hands the raw JSON back to the orchestrator.
//! Validation happens there, so a malformed model answer fails the same way
//! a malformed scripted decision would.

use postpilot_application::{ChatGateway, Decision, Mediator, MediatorError};
use postpilot_domain::{RunContext, ToolMetadata, WorkflowPromptTemplate, extract_instruction_json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Mediator that delegates each decision to a language model.
pub struct LlmMediator {
    gateway: Arc<dyn ChatGateway>,
}

impl LlmMediator {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl Mediator for LlmMediator {
    async fn decide(
        &self,
        context: &RunContext,
        tools: &[ToolMetadata],
    ) -> Result<Decision, MediatorError> {
        let context_value = serde_json::to_value(context)
            .map_err(|e| MediatorError::Other(format!("context not serializable: {}", e)))?;

        let system = WorkflowPromptTemplate::mediator_system();
        let prompt = WorkflowPromptTemplate::mediator_decide(&context_value, tools);

        let answer = self
            .gateway
            .complete(&system, &prompt)
            .await
            .map_err(|e| MediatorError::Gateway(e.to_string()))?;

        debug!(chars = answer.len(), "mediator model answered");

        match extract_instruction_json(&answer) {
            Some(value) => Ok(Decision::Raw(value)),
            None => {
                warn!("mediator model answer contained no JSON object");
                Err(MediatorError::NoDecision(snippet(&answer)))
            }
        }
    }
}

/// First part of the model answer, for error messages.
fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
