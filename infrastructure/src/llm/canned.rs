//! Deterministic chat gateway for offline runs and tests.
//!
//! Dispatches on wording that only appears in one prompt template each, so
//! every tool gets a response it can parse without a network round trip.

use postpilot_application::{ChatGateway, GatewayError};

/// Offline stand-in for a real model.
///
/// Used by `--offline` runs and by tests that exercise the tools end to end.
#[derive(Debug, Default, Clone)]
pub struct CannedChatGateway;

impl CannedChatGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChatGateway for CannedChatGateway {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, GatewayError> {
        if prompt.contains("extract the top keywords") {
            return Ok("rust, distributed systems, developer tools".to_string());
        }
        if prompt.contains("posting activity level") {
            return Ok("6.8".to_string());
        }
        if prompt.contains("future_growth_potential") {
            return Ok(r#"{
  "future_growth_potential": "Strong sustained interest across engineering audiences.",
  "high_engagement_accounts": "Tooling maintainers and platform engineering leads.",
  "potential_challenges_and_risks": "Crowded topic; generic takes get little reach."
}"#
            .to_string());
        }
        if prompt.contains("select the best trend") {
            return Ok("Memory-safe systems languages in production backends".to_string());
        }
        if prompt.contains("create a social media post") {
            return Ok(
                "Memory safety is no longer a research topic. Teams shipping \
                 production backends are making the switch and the incident \
                 graphs show why. What held your team back? #rustlang #backend"
                    .to_string(),
            );
        }
        // Mediator decide prompt or anything unrecognized: finish the run.
        Ok(r#"{"action": "done", "reason": "offline gateway has no further actions"}"#.to_string())
    }
}
