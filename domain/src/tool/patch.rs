//! Context patch — a tool's declaration of how its result folds into the run context.
//!
//! Instead of the orchestrator special-casing tool-name/result-shape pairs,
//! each tool can derive a [`ContextPatch`] from its own result. The
//! orchestrator applies the patch blindly, keeping the loop decoupled from
//! tool-specific result shapes.

use serde_json::Value;

/// Partial update to a [`RunContext`](crate::workflow::context::RunContext),
/// produced by a tool from its own result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPatch {
    /// Replace the context's profile snapshot
    pub profile: Option<Value>,
    /// Record this under `analyses[tool_name]`
    pub analysis: Option<Value>,
}

impl ContextPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_profile(mut self, profile: Value) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn set_analysis(mut self, analysis: Value) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// The default patch: lift the result's `analysis` field when present.
    ///
    /// Most tools that produce an analysis embed it under this key, so this
    /// is the `Tool::context_patch` default implementation.
    pub fn from_analysis(result: &Value) -> Self {
        match result.get("analysis") {
            Some(analysis) => Self::new().set_analysis(analysis.clone()),
            None => Self::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.analysis.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_analysis_lifts_field() {
        let result = json!({"trends": [], "analysis": {"future_growth_potential": "high"}});
        let patch = ContextPatch::from_analysis(&result);
        assert_eq!(patch.analysis, Some(json!({"future_growth_potential": "high"})));
        assert!(patch.profile.is_none());
    }

    #[test]
    fn test_from_analysis_without_field_is_empty() {
        let patch = ContextPatch::from_analysis(&json!({"seconds_remaining": 5}));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_builder() {
        let patch = ContextPatch::new().set_profile(json!({"name": "Dana"}));
        assert!(!patch.is_empty());
        assert_eq!(patch.profile, Some(json!({"name": "Dana"})));
    }
}
