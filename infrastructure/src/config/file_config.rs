//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to runtime parameter
//! types before being handed to the application layer.

use postpilot_application::WorkflowParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("workflow.tool_timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("llm.model cannot be empty")]
    EmptyModelName,

    #[error("llm.base_url cannot be empty")]
    EmptyBaseUrl,
}

/// Raw workflow configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    /// Maximum mediator consultations per run
    pub max_steps: u32,
    /// Timeout in seconds for a single tool invocation
    pub tool_timeout_secs: u64,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            max_steps: 8,
            tool_timeout_secs: 30,
        }
    }
}

/// Raw model-backend configuration from TOML
///
/// Defaults target Groq's OpenAI-compatible endpoint. The API key itself
/// never lives in the file; only the name of the environment variable
/// that holds it does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL of the OpenAI-compatible chat API
    pub base_url: String,
    /// Model identifier sent with every completion request
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

/// Raw upstream social-platform configuration from TOML
///
/// When `base_url` is unset the CLI wires in the in-memory stub API,
/// which is also what `--offline` forces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUpstreamConfig {
    /// Base URL of the social-platform API (profiles, trends, posts)
    pub base_url: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Workflow loop settings
    pub workflow: FileWorkflowConfig,
    /// Model backend settings
    pub llm: FileLlmConfig,
    /// Upstream platform settings
    pub upstream: FileUpstreamConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.workflow.tool_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        Ok(())
    }

    /// Convert the workflow section into runtime loop parameters
    pub fn workflow_params(&self) -> WorkflowParams {
        WorkflowParams::default()
            .with_max_steps(self.workflow.max_steps)
            .with_tool_timeout(Duration::from_secs(self.workflow.tool_timeout_secs))
    }
}
