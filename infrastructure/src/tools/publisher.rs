//! `publisher` tool — push a drafted post live immediately.
//!
//! Validates visibility against the platform's accepted values and hands
//! the draft to the [`PostPublisher`] seam.

use async_trait::async_trait;
use chrono::Utc;
use postpilot_application::Tool;
use postpilot_domain::ToolError;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;

use super::args;
use super::sources::{PostPublisher, PublishRequest};

const VISIBILITIES: [&str; 3] = ["public", "connections", "private"];
const DEFAULT_VISIBILITY: &str = "connections";

pub struct PublisherTool {
    api: Arc<dyn PostPublisher>,
}

impl PublisherTool {
    pub fn new(api: Arc<dyn PostPublisher>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for PublisherTool {
    fn name(&self) -> &str {
        "publisher"
    }

    fn description(&self) -> &str {
        "Publish a drafted post immediately. Requires: user_id, content. \
         Optional: media_urls, visibility (public/connections/private), tags."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let user_id = args::require_str(args, "user_id")?;
        let content = args::require_str(args, "content")?;
        let media_urls = args::optional_str_list(args, "media_urls")?;
        let tags = args::optional_str_list(args, "tags")?;

        let visibility = args::optional_str(args, "visibility").unwrap_or(DEFAULT_VISIBILITY);
        if !VISIBILITIES.contains(&visibility) {
            return Err(ToolError::invalid_argument(format!(
                "visibility must be one of public, connections, private (got {})",
                visibility
            )));
        }

        let request = PublishRequest {
            user_id: user_id.to_string(),
            content: content.to_string(),
            media_urls,
            visibility: visibility.to_string(),
            tags,
        };

        let response = self.api.publish(&request).await?;
        let post_id = response["post_id"]
            .as_str()
            .ok_or_else(|| ToolError::upstream_failed("publish response missing post_id"))?
            .to_string();

        info!(user_id, post_id = %post_id, "post published");

        Ok(json!({
            "post_id": post_id,
            "url": response["url"].clone(),
            "status": "published",
            "published_at": Utc::now().to_rfc3339(),
        }))
    }
}
