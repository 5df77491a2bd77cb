//! Tool port and registry
//!
//! A [`Tool`] is any unit exposing an asynchronous invocation over named
//! JSON arguments. The orchestrator performs no argument-shape validation;
//! a mismatched argument set surfaces as a tool-raised error, recorded per
//! step and recoverable. The [`ToolRegistry`] maps names to tools and keeps
//! registration order for the metadata shown to mediators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use postpilot_domain::{ContextPatch, ToolError, ToolMetadata};

/// A capability unit invoked by name with keyword arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable name: the registry key and the value mediators put in
    /// `ActionInstruction.tool`
    fn name(&self) -> &str;

    /// Free text shown to the mediator for decision-making, never parsed
    fn description(&self) -> &str;

    /// Run the tool. Must be safely callable with arbitrary arguments
    /// decided by the mediator; the tool validates its own inputs.
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError>;

    /// Declare how this tool's result folds into the run context.
    ///
    /// Default: lift the result's `analysis` field when present. Tools whose
    /// results carry other context-worthy shapes (the profile tool) override
    /// this.
    fn context_patch(&self, result: &Value) -> ContextPatch {
        ContextPatch::from_analysis(result)
    }
}

/// Name-keyed collection of tools, read-only for the duration of a run and
/// safely shareable across concurrent runs.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool (builder pattern). A tool registered under an already
    /// present name replaces the earlier one.
    pub fn register<T: Tool + 'static>(self, tool: T) -> Self {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool (Arc version)
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&i) => self.tools[i] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Metadata for every registered tool, in registration order.
    ///
    /// Built once per run and handed to the mediator on every decide call.
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        self.tools
            .iter()
            .map(|t| ToolMetadata::new(t.name(), t.description()))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedTool {
        name: &'static str,
        result: Value,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "returns a fixed value"
        }

        async fn invoke(&self, _args: &Map<String, Value>) -> Result<Value, ToolError> {
            Ok(self.result.clone())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(FixedTool { name: "profile", result: json!({"profile": {}}) })
            .register(FixedTool { name: "research", result: json!({"trends": []}) })
    }

    #[test]
    fn test_register_and_get() {
        let reg = registry();
        assert_eq!(reg.len(), 2);
        assert!(reg.contains("profile"));
        assert!(reg.get("research").is_some());
        assert!(reg.get("publisher").is_none());
    }

    #[test]
    fn test_metadata_preserves_registration_order() {
        let meta = registry().metadata();
        assert_eq!(meta[0].name, "profile");
        assert_eq!(meta[1].name, "research");
    }

    #[test]
    fn test_reregister_replaces_without_reordering() {
        let reg = registry().register(FixedTool { name: "profile", result: json!({"v": 2}) });
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.names(), vec!["profile", "research"]);
    }

    #[tokio::test]
    async fn test_default_context_patch_lifts_analysis() {
        let tool = FixedTool { name: "research", result: json!({}) };
        let patch = tool.context_patch(&json!({"analysis": {"k": 1}}));
        assert_eq!(patch.analysis, Some(json!({"k": 1})));
        assert!(patch.profile.is_none());
    }
}
