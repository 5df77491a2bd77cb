//! OpenAI-compatible chat completion client.
//!
//! Speaks the `/chat/completions` wire format, which Groq, OpenAI, and
//! most self-hosted inference servers all accept. The default endpoint
//! and model target Groq (`llama-3.3-70b-versatile`).

use postpilot_application::{ChatGateway, GatewayError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default request timeout for a single completion call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat gateway backed by an OpenAI-compatible HTTP API.
pub struct OpenAiChatGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiChatGateway {
    /// Create a gateway for the given endpoint and model.
    ///
    /// `base_url` is the API root without the `/chat/completions` suffix,
    /// e.g. `https://api.groq.com/openai/v1`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            temperature: 0.2,
        }
    }

    /// Read the API key from the environment variable named in config.
    pub fn from_env(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_env: &str,
    ) -> Result<Self, GatewayError> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| GatewayError::MissingApiKey(api_key_env.to_string()))?;
        Ok(Self::new(base_url, model, api_key))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl ChatGateway for OpenAiChatGateway {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!(model = %self.model, url = %url, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "API returned {}: {}",
                status,
                truncate(&body, 300)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(format!("invalid completion body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::BadResponse("completion had no choices".to_string()))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let gateway = OpenAiChatGateway::new("https://api.groq.com/openai/v1/", "m", "k");
        assert_eq!(gateway.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_from_env_missing_key() {
        let err = OpenAiChatGateway::from_env("https://x", "m", "POSTPILOT_TEST_NO_SUCH_KEY")
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::MissingApiKey(_)));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "hello"}}
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ab", 10), "ab");
    }
}
