//! Upstream social-platform seams.
//!
//! The profile, research, and publisher tools never talk HTTP directly;
//! they go through these traits. [`HttpSocialApi`] is the real client,
//! [`InMemorySocialApi`] backs `--offline` runs and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use postpilot_domain::ToolError;
use serde_json::{Value, json};
use std::sync::Mutex;

/// Source of user profile snapshots.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Value, ToolError>;
}

/// Source of trending topics for a field.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch_trends(&self, field: &str, limit: usize) -> Result<Vec<Value>, ToolError>;
}

/// Outbound post submission.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub user_id: String,
    pub content: String,
    pub media_urls: Vec<String>,
    pub visibility: String,
    pub tags: Vec<String>,
}

/// Sink that turns a draft into a live post.
///
/// The response object must carry `post_id` and may carry `url`.
#[async_trait]
pub trait PostPublisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<Value, ToolError>;
}

/// HTTP client for a social platform exposing profiles, trends, and posts.
pub struct HttpSocialApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSocialApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Value, ToolError> {
        let response = request
            .send()
            .await
            .map_err(|e| ToolError::upstream_failed(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::upstream_failed(format!(
                "{} returned {}",
                url, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::upstream_failed(format!("{} returned invalid JSON: {}", url, e)))
    }
}

#[async_trait]
impl ProfileSource for HttpSocialApi {
    async fn fetch_profile(&self, user_id: &str) -> Result<Value, ToolError> {
        let url = format!("{}/profiles/{}", self.base_url, user_id);
        self.send_json(self.client.get(&url), &url).await
    }
}

#[async_trait]
impl TrendSource for HttpSocialApi {
    async fn fetch_trends(&self, field: &str, limit: usize) -> Result<Vec<Value>, ToolError> {
        let url = format!("{}/trends", self.base_url);
        let limit = limit.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("field", field), ("limit", limit.as_str())]);
        let body = self.send_json(request, &url).await?;

        // Accept both a bare array and an object with a "trends" field.
        match body {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => match map.remove("trends") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(ToolError::upstream_failed(
                    "trend response had no trends array",
                )),
            },
            _ => Err(ToolError::upstream_failed(
                "trend response had no trends array",
            )),
        }
    }
}

#[async_trait]
impl PostPublisher for HttpSocialApi {
    async fn publish(&self, request: &PublishRequest) -> Result<Value, ToolError> {
        let url = format!("{}/posts", self.base_url);
        let body = json!({
            "user_id": request.user_id,
            "content": request.content,
            "media_urls": request.media_urls,
            "visibility": request.visibility,
            "tags": request.tags,
        });

        self.send_json(self.client.post(&url).json(&body), &url).await
    }
}

/// Fixture-backed platform for offline runs and tests.
///
/// Publishes are recorded and can be read back with [`published`](Self::published).
#[derive(Default)]
pub struct InMemorySocialApi {
    published: Mutex<Vec<Value>>,
}

impl InMemorySocialApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts accepted so far, oldest first.
    pub fn published(&self) -> Vec<Value> {
        self.published
            .lock()
            .map(|posts| posts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProfileSource for InMemorySocialApi {
    async fn fetch_profile(&self, user_id: &str) -> Result<Value, ToolError> {
        let recent = (Utc::now() - Duration::days(3)).to_rfc3339();
        Ok(json!({
            "user_id": user_id,
            "name": "Dana Whitfield",
            "headline": "Backend engineer writing about infrastructure",
            "skills": ["Rust", "distributed systems", "observability"],
            "experience": [
                {"title": "Staff Engineer", "company": "Meridian Labs", "years": 4},
                {"title": "Platform Engineer", "company": "Northline", "years": 3}
            ],
            "recent_post_time": recent,
            "post_count": 12
        }))
    }
}

#[async_trait]
impl TrendSource for InMemorySocialApi {
    async fn fetch_trends(&self, field: &str, limit: usize) -> Result<Vec<Value>, ToolError> {
        let all = vec![
            json!({"title": format!("{} hiring signals", field), "volume": 18200}),
            json!({"title": format!("{} tooling consolidation", field), "volume": 9400}),
            json!({"title": format!("open source funding in {}", field), "volume": 7300}),
            json!({"title": format!("{} conference season takeaways", field), "volume": 4100}),
        ];
        Ok(all.into_iter().take(limit).collect())
    }
}

#[async_trait]
impl PostPublisher for InMemorySocialApi {
    async fn publish(&self, request: &PublishRequest) -> Result<Value, ToolError> {
        let mut posts = self
            .published
            .lock()
            .map_err(|_| ToolError::execution_failed("publish store poisoned"))?;
        let post_id = format!("post-{}", posts.len() + 1);
        let record = json!({
            "post_id": post_id,
            "url": format!("https://social.example/posts/{}", post_id),
            "user_id": request.user_id,
            "content": request.content,
            "visibility": request.visibility,
            "tags": request.tags,
        });
        posts.push(record.clone());
        Ok(record)
    }
}
