//! Tool metadata — what the mediator sees.

use serde::{Deserialize, Serialize};

/// Name and description of one registered tool.
///
/// The name doubles as the registry key and the value mediators put in
/// `ActionInstruction.tool`. The description is free text for the mediator's
/// decision-making; it is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
