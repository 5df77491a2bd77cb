//! Mediator adapters
//!
//! The rule-based [`ScriptMediator`](postpilot_application::ScriptMediator)
//! lives in the application layer; this module holds the model-backed one.

mod llm;

pub use llm::LlmMediator;
