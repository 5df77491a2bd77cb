//! Chat gateway port
//!
//! Narrow seam for the language model. Used by the model-backed mediator and
//! by the tools that draft or analyze text. Implementations (adapters) live
//! in the infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during chat gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("missing API key: set {0}")]
    MissingApiKey(String),
}

/// Gateway for model completions.
///
/// One operation: send a system prompt plus a user prompt, get the model's
/// text back. No streaming and no session state; every call is independent.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError>;
}
