//! `content` tool — draft a post from the profile and trend analysis.
//!
//! Two model calls: first pick the single best trend for this user, then
//! write the post text for it.

use async_trait::async_trait;
use postpilot_application::{ChatGateway, Tool};
use postpilot_domain::{ToolError, WorkflowPromptTemplate};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::args;
use super::ANALYST_SYSTEM;

pub struct ContentTool {
    gateway: Arc<dyn ChatGateway>,
}

impl ContentTool {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for ContentTool {
    fn name(&self) -> &str {
        "content"
    }

    fn description(&self) -> &str {
        "Select the best trend for the user and draft the post text. \
         Requires: profile. Optional: analysis."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let profile = args::require_value(args, "profile")?;
        let analysis = args.get("analysis").cloned().unwrap_or(Value::Null);

        let finalize_prompt = WorkflowPromptTemplate::trend_finalize(profile, &analysis);
        let selected_trend = self
            .gateway
            .complete(ANALYST_SYSTEM, &finalize_prompt)
            .await
            .map_err(|e| ToolError::upstream_failed(format!("trend selection failed: {}", e)))?
            .trim()
            .to_string();

        if selected_trend.is_empty() {
            return Err(ToolError::upstream_failed("trend selection came back empty"));
        }

        let creation_prompt = WorkflowPromptTemplate::content_creation(&selected_trend, &analysis);
        let content = self
            .gateway
            .complete(ANALYST_SYSTEM, &creation_prompt)
            .await
            .map_err(|e| ToolError::upstream_failed(format!("content drafting failed: {}", e)))?
            .trim()
            .to_string();

        Ok(json!({
            "selected_trend": selected_trend,
            "content": content,
        }))
    }
}
