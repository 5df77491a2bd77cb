//! Run context — the per-run mutable accumulator.
//!
//! One [`RunContext`] exists per run. It is exclusively owned and mutated by
//! the orchestrator and handed to the mediator by reference each step; the
//! mediator reads it to decide what should happen next but never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::tool::patch::ContextPatch;
use crate::tool::value_objects::ToolOutput;

/// Record of one tool dispatch attempt.
///
/// Appended to [`RunContext::tools_called`] *before* the tool is invoked, so
/// a timeout or crash still leaves an audit record of the attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool that was dispatched
    pub tool: String,
    /// Arguments as decided by the mediator
    pub args: Map<String, Value>,
    /// When the dispatch was attempted
    pub timestamp: DateTime<Utc>,
}

/// Caller-provided seed for pre-populating context fields at run start,
/// e.g. a cached profile so the mediator can skip the profile tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

impl ContextSeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Value) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Run-scoped state accumulated across steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Opaque run identifier, set once at run start
    pub user_id: String,
    /// Last known profile snapshot; null until a profile-producing tool succeeds
    pub profile: Option<Value>,
    /// Full dispatch history, append-only
    pub tools_called: Vec<ToolCallRecord>,
    /// Raw tool results in dispatch order, append-only
    pub tool_outputs: Vec<ToolOutput>,
    /// Per-tool `analysis` sub-results, populated opportunistically
    pub analyses: BTreeMap<String, Value>,
}

impl RunContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            profile: None,
            tools_called: Vec::new(),
            tool_outputs: Vec::new(),
            analyses: BTreeMap::new(),
        }
    }

    /// Create a context pre-populated from a caller-provided seed
    pub fn seeded(user_id: impl Into<String>, seed: ContextSeed) -> Self {
        let mut ctx = Self::new(user_id);
        ctx.profile = seed.profile;
        ctx
    }

    /// Record a dispatch attempt (called before the tool is invoked)
    pub fn record_call(&mut self, tool: impl Into<String>, args: Map<String, Value>) {
        self.tools_called.push(ToolCallRecord {
            tool: tool.into(),
            args,
            timestamp: Utc::now(),
        });
    }

    /// Record a successful tool result and fold its context patch in
    pub fn record_output(&mut self, tool: impl Into<String>, result: Value, patch: ContextPatch) {
        let tool = tool.into();
        self.tool_outputs.push(ToolOutput::new(&tool, result));
        if let Some(profile) = patch.profile {
            self.profile = Some(profile);
        }
        if let Some(analysis) = patch.analysis {
            self.analyses.insert(tool, analysis);
        }
    }

    /// Has the named tool already produced output in this run?
    ///
    /// Used by mediators to branch ("research already ran, move on").
    pub fn has_output(&self, tool: &str) -> bool {
        self.tool_outputs.iter().any(|o| o.tool == tool)
    }

    /// Latest result produced by the named tool, if any
    pub fn last_output(&self, tool: &str) -> Option<&Value> {
        self.tool_outputs
            .iter()
            .rev()
            .find(|o| o.tool == tool)
            .map(|o| &o.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = RunContext::new("u-1");
        assert_eq!(ctx.user_id, "u-1");
        assert!(ctx.profile.is_none());
        assert!(ctx.tools_called.is_empty());
        assert!(ctx.tool_outputs.is_empty());
        assert!(ctx.analyses.is_empty());
    }

    #[test]
    fn test_seeded_context_carries_profile() {
        let seed = ContextSeed::new().with_profile(json!({"name": "Dana"}));
        let ctx = RunContext::seeded("u-1", seed);
        assert_eq!(ctx.profile, Some(json!({"name": "Dana"})));
    }

    #[test]
    fn test_record_call_appends_before_outcome() {
        let mut ctx = RunContext::new("u-1");
        ctx.record_call("profile", Map::new());
        assert_eq!(ctx.tools_called.len(), 1);
        assert_eq!(ctx.tools_called[0].tool, "profile");
        // No output yet — the call record exists independently of the result
        assert!(ctx.tool_outputs.is_empty());
    }

    #[test]
    fn test_record_output_applies_patch() {
        let mut ctx = RunContext::new("u-1");
        let result = json!({"profile": {"name": "Dana"}, "analysis": {"activity_level": 6}});
        let patch = ContextPatch::new()
            .set_profile(json!({"name": "Dana"}))
            .set_analysis(json!({"activity_level": 6}));

        ctx.record_output("profile", result, patch);

        assert_eq!(ctx.profile, Some(json!({"name": "Dana"})));
        assert_eq!(ctx.analyses.get("profile"), Some(&json!({"activity_level": 6})));
        assert!(ctx.has_output("profile"));
        assert!(!ctx.has_output("research"));
    }

    #[test]
    fn test_empty_patch_leaves_context_untouched() {
        let mut ctx = RunContext::new("u-1");
        ctx.record_output("timer", json!({"seconds_remaining": 42}), ContextPatch::new());
        assert!(ctx.profile.is_none());
        assert!(ctx.analyses.is_empty());
        assert!(ctx.has_output("timer"));
    }

    #[test]
    fn test_last_output_returns_most_recent() {
        let mut ctx = RunContext::new("u-1");
        ctx.record_output("research", json!({"trends": [1]}), ContextPatch::new());
        ctx.record_output("research", json!({"trends": [2]}), ContextPatch::new());
        assert_eq!(ctx.last_output("research"), Some(&json!({"trends": [2]})));
        assert_eq!(ctx.last_output("content"), None);
    }
}
