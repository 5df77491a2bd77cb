//! Domain layer for postpilot
//!
//! This crate contains the core business types for the content-workflow
//! agent. It has no dependencies on infrastructure or transport concerns.
//!
//! # Core Concepts
//!
//! ## Workflow Run
//!
//! One run automates a social-content workflow for a single user: fetch the
//! profile, research trends, draft a post, schedule or publish it. The run is
//! driven step by step by a *mediator* (decision-maker) choosing which *tool*
//! to invoke next.
//!
//! ## Instruction / Context / Trace
//!
//! - [`ActionInstruction`]: the validated decision returned by the mediator
//!   each step (`call_tool` or `done`)
//! - [`RunContext`]: run-scoped accumulator of tool calls and outputs, read
//!   by the mediator on every decision
//! - [`TraceEntry`]: append-only audit record of every step's outcome

pub mod prompt;
pub mod tool;
pub mod workflow;

// Re-export commonly used types
pub use prompt::WorkflowPromptTemplate;
pub use tool::{
    metadata::ToolMetadata,
    patch::ContextPatch,
    value_objects::{ToolError, ToolOutput},
};
pub use workflow::{
    context::{ContextSeed, RunContext, ToolCallRecord},
    instruction::{Action, ActionInstruction, InstructionError, extract_instruction_json},
    trace::{RunOutcome, RunRecord, TraceEntry},
};
