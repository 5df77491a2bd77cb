//! Infrastructure layer for postpilot
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the chat gateway, the model-backed mediator, the six
//! workflow tools with their upstream clients, run-history logging, and
//! configuration file loading.

pub mod config;
pub mod llm;
pub mod logging;
pub mod mediators;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileUpstreamConfig,
    FileWorkflowConfig,
};
pub use llm::{CannedChatGateway, OpenAiChatGateway};
pub use logging::JsonlRunLogger;
pub use mediators::LlmMediator;
pub use tools::{
    ContentTool, HttpSocialApi, InMemorySocialApi, PostPublisher, ProfileSource, ProfileTool,
    PublishRequest, PublisherTool, ResearchTool, ScheduledPost, SchedulerTool, TimerTool,
    TrendSource, standard_registry,
};
