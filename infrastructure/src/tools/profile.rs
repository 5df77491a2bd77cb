//! `profile` tool — fetch a user's profile and analyze it.
//!
//! Two model calls enrich the raw profile: one extracts the top keywords
//! from skills and experience, one scores posting activity on a 1-10 scale.
//! The result's `profile` field replaces the context profile snapshot and
//! the `analysis` field is folded into the context analyses.

use async_trait::async_trait;
use postpilot_application::{ChatGateway, Tool};
use postpilot_domain::{ContextPatch, ToolError, WorkflowPromptTemplate};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

use super::args;
use super::sources::ProfileSource;
use super::ANALYST_SYSTEM;

pub struct ProfileTool {
    source: Arc<dyn ProfileSource>,
    gateway: Arc<dyn ChatGateway>,
}

impl ProfileTool {
    pub fn new(source: Arc<dyn ProfileSource>, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { source, gateway }
    }
}

#[async_trait]
impl Tool for ProfileTool {
    fn name(&self) -> &str {
        "profile"
    }

    fn description(&self) -> &str {
        "Fetch the user's profile and analyze their top keywords and posting activity level. \
         Requires: user_id."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let user_id = args::require_str(args, "user_id")?;

        let profile = self.source.fetch_profile(user_id).await?;
        debug!(user_id, "profile fetched");

        let keywords_prompt =
            WorkflowPromptTemplate::profile_keywords(&profile["skills"], &profile["experience"]);
        let keywords_answer = self
            .gateway
            .complete(ANALYST_SYSTEM, &keywords_prompt)
            .await
            .map_err(|e| ToolError::upstream_failed(format!("keyword analysis failed: {}", e)))?;
        let top_keywords = parse_keyword_list(&keywords_answer);

        let activity_prompt = WorkflowPromptTemplate::profile_activity_level(
            profile["recent_post_time"].as_str(),
            profile["post_count"].as_u64().unwrap_or(0),
        );
        let activity_answer = self
            .gateway
            .complete(ANALYST_SYSTEM, &activity_prompt)
            .await
            .map_err(|e| ToolError::upstream_failed(format!("activity analysis failed: {}", e)))?;
        let activity_level = parse_leading_number(&activity_answer).ok_or_else(|| {
            ToolError::upstream_failed(format!(
                "activity analysis was not numeric: {}",
                activity_answer.trim()
            ))
        })?;

        Ok(json!({
            "profile": profile,
            "analysis": {
                "top_keywords": top_keywords,
                "activity_level": activity_level,
            }
        }))
    }

    fn context_patch(&self, result: &Value) -> ContextPatch {
        let mut patch = ContextPatch::from_analysis(result);
        if !result["profile"].is_null() {
            patch = patch.set_profile(result["profile"].clone());
        }
        patch
    }
}

/// Split a model keyword answer on commas and newlines.
fn parse_keyword_list(answer: &str) -> Vec<String> {
    answer
        .split(|c| c == ',' || c == '\n')
        .map(|s| s.trim().trim_start_matches('-').trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First number in the answer, tolerating trailing prose like "7.2 (high)".
fn parse_leading_number(answer: &str) -> Option<f64> {
    answer
        .split_whitespace()
        .find_map(|token| token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.').parse().ok())
}
