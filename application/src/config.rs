//! Workflow parameters — orchestrator loop control.
//!
//! [`WorkflowParams`] groups the static parameters that bound one run in
//! [`RunWorkflowUseCase`](crate::use_cases::run_workflow::RunWorkflowUseCase).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loop control parameters for one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowParams {
    /// Step budget: the run terminates with a `max_steps_reached` marker when
    /// this many steps complete without an explicit `done`. Must be positive;
    /// zero is treated as 1.
    pub max_steps: u32,
    /// Hard bound on each individual tool invocation. Expiry cancels that one
    /// invocation only, never the surrounding loop.
    pub tool_timeout: Duration,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            max_steps: 8,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkflowParams {
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = WorkflowParams::default();
        assert_eq!(params.max_steps, 8);
        assert_eq!(params.tool_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builders() {
        let params = WorkflowParams::default()
            .with_max_steps(12)
            .with_tool_timeout(Duration::from_secs(5));
        assert_eq!(params.max_steps, 12);
        assert_eq!(params.tool_timeout, Duration::from_secs(5));
    }
}
