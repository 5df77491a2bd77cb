//! Chat gateway adapters
//!
//! [`OpenAiChatGateway`] talks to any OpenAI-compatible `/chat/completions`
//! endpoint (Groq by default). [`CannedChatGateway`] answers deterministically
//! for offline runs and tests.

mod canned;
mod openai;

pub use canned::CannedChatGateway;
pub use openai::OpenAiChatGateway;
