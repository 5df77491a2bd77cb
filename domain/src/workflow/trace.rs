//! Run trace — the permanent audit log of one run.
//!
//! One [`TraceEntry`] is appended per loop iteration (plus the budget marker
//! when the step budget runs out). Entries are never mutated after being
//! appended. The JSON shapes are part of the run record's contract:
//!
//! | Entry | Shape |
//! |-------|-------|
//! | completion | `{"step", "action": "done", "reason"}` |
//! | tool success | `{"step", "tool", "args", "result"}` |
//! | tool failure | `{"step", "tool", "args", "error"}` |
//! | step error | `{"step", "error"}` |
//!
//! Callers distinguish success, budget exhaustion, and failure by inspecting
//! the trace's last entry ([`RunRecord::outcome`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflow::instruction::Action;

/// Marker written into step-error entries when the step budget is exhausted
pub const MAX_STEPS_REACHED: &str = "max_steps_reached";

/// One step's outcome in the audit trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceEntry {
    /// The mediator signaled completion
    Done {
        step: u32,
        action: Action,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// A tool was dispatched and returned a result
    ToolSuccess {
        step: u32,
        tool: String,
        args: Map<String, Value>,
        result: Value,
    },
    /// A tool was dispatched and timed out or raised
    ToolFailure {
        step: u32,
        tool: String,
        args: Map<String, Value>,
        error: String,
    },
    /// A decision-layer error (mediator exception, invalid instruction,
    /// unsupported action, unknown tool) or the budget marker
    StepError { step: u32, error: String },
}

impl TraceEntry {
    pub fn done(step: u32, reason: Option<String>) -> Self {
        TraceEntry::Done {
            step,
            action: Action::Done,
            reason,
        }
    }

    pub fn tool_success(
        step: u32,
        tool: impl Into<String>,
        args: Map<String, Value>,
        result: Value,
    ) -> Self {
        TraceEntry::ToolSuccess {
            step,
            tool: tool.into(),
            args,
            result,
        }
    }

    pub fn tool_failure(
        step: u32,
        tool: impl Into<String>,
        args: Map<String, Value>,
        error: impl Into<String>,
    ) -> Self {
        TraceEntry::ToolFailure {
            step,
            tool: tool.into(),
            args,
            error: error.into(),
        }
    }

    pub fn step_error(step: u32, error: impl Into<String>) -> Self {
        TraceEntry::StepError {
            step,
            error: error.into(),
        }
    }

    pub fn step(&self) -> u32 {
        match self {
            TraceEntry::Done { step, .. }
            | TraceEntry::ToolSuccess { step, .. }
            | TraceEntry::ToolFailure { step, .. }
            | TraceEntry::StepError { step, .. } => *step,
        }
    }

    /// The error text, for failure and step-error entries
    pub fn error(&self) -> Option<&str> {
        match self {
            TraceEntry::ToolFailure { error, .. } | TraceEntry::StepError { error, .. } => {
                Some(error.as_str())
            }
            _ => None,
        }
    }

    /// Whether this entry terminates a run when it is the last one appended
    pub fn is_terminal(&self) -> bool {
        matches!(self, TraceEntry::Done { .. } | TraceEntry::StepError { .. })
    }
}

/// How a run ended, derived from the trace's last entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The mediator returned `done`
    Completed,
    /// The step budget was exhausted without explicit completion
    BudgetExhausted,
    /// A decision-layer error terminated the run
    Failed,
}

/// The immutable result of one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub user_id: String,
    pub trace: Vec<TraceEntry>,
    pub finished_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(user_id: impl Into<String>, trace: Vec<TraceEntry>) -> Self {
        Self {
            user_id: user_id.into(),
            trace,
            finished_at: Utc::now(),
        }
    }

    /// Classify the run by its last trace entry
    pub fn outcome(&self) -> RunOutcome {
        match self.trace.last() {
            Some(TraceEntry::Done { .. }) => RunOutcome::Completed,
            Some(TraceEntry::StepError { error, .. }) if error == MAX_STEPS_REACHED => {
                RunOutcome::BudgetExhausted
            }
            _ => RunOutcome::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome() == RunOutcome::Completed
    }
}
