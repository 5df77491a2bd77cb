//! Script mediator — deterministic reference decision-maker.
//!
//! Drives the fixed content-workflow sequence profile → research → content →
//! scheduler (or publisher) → done, branching only on which categories of
//! output already appear in the run context. Exists so the orchestrator can
//! be tested and demoed without wiring a model.

use async_trait::async_trait;
use serde_json::{Value, json};

use postpilot_domain::{ActionInstruction, RunContext, ToolMetadata};

use crate::ports::mediator::{Decision, Mediator, MediatorError};

/// Field used for research when the profile yields no keywords
const FALLBACK_FIELD: &str = "technology";

/// Deterministic script-following mediator.
#[derive(Debug, Clone, Default)]
pub struct ScriptMediator {
    /// Publish immediately instead of scheduling
    auto_publish: bool,
}

impl ScriptMediator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_publish(mut self, auto_publish: bool) -> Self {
        self.auto_publish = auto_publish;
        self
    }

    /// Best research field given what we know about the user: first top
    /// keyword from the profile analysis, else first profile skill.
    fn research_field(context: &RunContext) -> String {
        let from_analysis = context
            .analyses
            .get("profile")
            .and_then(|a| a.get("top_keywords"))
            .and_then(|k| k.as_array())
            .and_then(|k| k.first())
            .and_then(|k| k.as_str());

        let from_skills = context
            .profile
            .as_ref()
            .and_then(|p| p.get("skills"))
            .and_then(|s| s.as_array())
            .and_then(|s| s.first())
            .and_then(|s| s.as_str());

        from_analysis
            .or(from_skills)
            .unwrap_or(FALLBACK_FIELD)
            .to_string()
    }

    /// Post text drafted by the content tool, if it already ran
    fn drafted_content(context: &RunContext) -> Option<Value> {
        context
            .last_output("content")
            .and_then(|o| o.get("content"))
            .cloned()
    }
}

#[async_trait]
impl Mediator for ScriptMediator {
    async fn decide(
        &self,
        context: &RunContext,
        _tools: &[ToolMetadata],
    ) -> Result<Decision, MediatorError> {
        // 1. No profile yet: fetch it
        if context.profile.is_none() {
            return Ok(ActionInstruction::call_tool("profile")
                .with_arg("user_id", context.user_id.clone())
                .into());
        }

        // 2. No trends yet: research the user's strongest field
        if !context.has_output("research") {
            return Ok(ActionInstruction::call_tool("research")
                .with_arg("field", Self::research_field(context))
                .with_arg("limit", 3)
                .into());
        }

        // 3. No draft yet: generate content from profile + research analysis
        if !context.has_output("content") {
            let analysis = context.analyses.get("research").cloned().unwrap_or(json!({}));
            return Ok(ActionInstruction::call_tool("content")
                .with_arg("profile", context.profile.clone().unwrap_or(Value::Null))
                .with_arg("analysis", analysis)
                .into());
        }

        // 4. Hand off: publish now, or schedule for an optimized slot
        if self.auto_publish {
            if !context.has_output("publisher") {
                return Ok(ActionInstruction::call_tool("publisher")
                    .with_arg("user_id", context.user_id.clone())
                    .with_arg("content", Self::drafted_content(context).unwrap_or(Value::Null))
                    .into());
            }
        } else if !context.has_output("scheduler") {
            return Ok(ActionInstruction::call_tool("scheduler")
                .with_arg("content_id", format!("draft-{}", context.user_id))
                .with_arg("optimize", true)
                .into());
        }

        Ok(ActionInstruction::done("all core workflow tasks completed").into())
    }
}
