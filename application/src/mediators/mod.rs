//! Reference mediators
//!
//! The deterministic [`ScriptMediator`](script::ScriptMediator) lives here so
//! the orchestrator can be exercised without any model wiring. The
//! model-backed mediator is an infrastructure adapter.

pub mod script;
