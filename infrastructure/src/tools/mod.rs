//! Concrete workflow tools.
//!
//! | Tool | Upstream | Model calls | Purpose |
//! |------|----------|:---:|---------|
//! | `profile` | [`ProfileSource`] | 2 | Fetch and analyze the user's profile |
//! | `research` | [`TrendSource`] | 1 | Fetch and analyze trending topics |
//! | `content` | — | 2 | Select a trend and draft the post |
//! | `scheduler` | — | 0 | Queue the post for a publication slot |
//! | `timer` | — | 0 | Time remaining until a scheduled slot |
//! | `publisher` | [`PostPublisher`] | 0 | Push the post live immediately |
//!
//! Every tool validates its own arguments and reports failures as
//! [`ToolError`](postpilot_domain::ToolError); the orchestrator records the
//! error and lets the run continue.

mod args;
mod content;
mod profile;
mod publisher;
mod research;
mod scheduler;
mod sources;
mod timer;

pub use content::ContentTool;
pub use profile::ProfileTool;
pub use publisher::PublisherTool;
pub use research::ResearchTool;
pub use scheduler::{ScheduledPost, SchedulerTool};
pub use sources::{
    HttpSocialApi, InMemorySocialApi, PostPublisher, ProfileSource, PublishRequest, TrendSource,
};
pub use timer::TimerTool;

use postpilot_application::{ChatGateway, ToolRegistry};
use std::sync::Arc;

/// System prompt for tool-internal model calls.
pub(crate) const ANALYST_SYSTEM: &str =
    "You are a precise assistant for a social-content workflow. \
     Answer with only what the prompt asks for, no preamble.";

/// Build the standard six-tool registry in canonical order.
pub fn standard_registry(
    profiles: Arc<dyn ProfileSource>,
    trends: Arc<dyn TrendSource>,
    publisher_api: Arc<dyn PostPublisher>,
    gateway: Arc<dyn ChatGateway>,
) -> ToolRegistry {
    ToolRegistry::new()
        .register(ProfileTool::new(profiles, gateway.clone()))
        .register(ResearchTool::new(trends, gateway.clone()))
        .register(ContentTool::new(gateway))
        .register(SchedulerTool::new())
        .register(TimerTool::new())
        .register(PublisherTool::new(publisher_api))
}
