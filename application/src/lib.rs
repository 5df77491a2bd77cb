//! Application layer for postpilot
//!
//! This crate contains the orchestrator use case, the port definitions the
//! orchestrator depends on (mediator, tool, chat gateway), and the reference
//! rule-based mediator. It depends only on the domain layer.

pub mod config;
pub mod mediators;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::WorkflowParams;
pub use mediators::script::ScriptMediator;
pub use ports::{
    chat_gateway::{ChatGateway, GatewayError},
    mediator::{Decision, Mediator, MediatorError},
    tool::{Tool, ToolRegistry},
};
pub use use_cases::run_workflow::{RunWorkflowInput, RunWorkflowUseCase};
