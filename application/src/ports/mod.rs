//! Port definitions
//!
//! The narrow contracts the orchestrator depends on. Adapters live in the
//! infrastructure layer (HTTP chat gateway, concrete tools, model-backed
//! mediator); the rule-based reference mediator lives in this crate.

pub mod chat_gateway;
pub mod mediator;
pub mod tool;
