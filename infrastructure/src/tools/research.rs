//! `research` tool — fetch trending topics for a field and analyze them.
//!
//! The upstream trend feed supplies raw topics; one model call turns them
//! into the structured analysis (growth potential, engagement accounts,
//! risks) the content tool later builds on.

use async_trait::async_trait;
use postpilot_application::{ChatGateway, Tool};
use postpilot_domain::{ToolError, WorkflowPromptTemplate};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

use super::args;
use super::sources::TrendSource;
use super::ANALYST_SYSTEM;

/// Fallback trend count when the mediator does not pass `limit`.
const DEFAULT_LIMIT: u64 = 3;

pub struct ResearchTool {
    source: Arc<dyn TrendSource>,
    gateway: Arc<dyn ChatGateway>,
}

impl ResearchTool {
    pub fn new(source: Arc<dyn TrendSource>, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { source, gateway }
    }
}

#[async_trait]
impl Tool for ResearchTool {
    fn name(&self) -> &str {
        "research"
    }

    fn description(&self) -> &str {
        "Fetch trending topics for a field and analyze their growth potential and risks. \
         Requires: field. Optional: limit."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let field = args::require_str(args, "field")?;
        let limit = args::optional_u64(args, "limit", DEFAULT_LIMIT)? as usize;

        let trends = self.source.fetch_trends(field, limit).await?;
        debug!(field, count = trends.len(), "trends fetched");

        let prompt = WorkflowPromptTemplate::trend_analysis(&Value::Array(trends.clone()));
        let answer = self
            .gateway
            .complete(ANALYST_SYSTEM, &prompt)
            .await
            .map_err(|e| ToolError::upstream_failed(format!("trend analysis failed: {}", e)))?;

        let analysis = parse_json_object(&answer).ok_or_else(|| {
            ToolError::upstream_failed("trend analysis answer was not a JSON object")
        })?;

        Ok(json!({
            "field": field,
            "trends": trends,
            "analysis": analysis,
        }))
    }
}

/// Parse a model answer as a JSON object, tolerating a ```json fence.
fn parse_json_object(answer: &str) -> Option<Value> {
    let trimmed = answer.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        trimmed
    };
    serde_json::from_str::<Value>(body.trim())
        .ok()
        .filter(Value::is_object)
}
