use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Request body for generating seed questions about a resource.
///
/// The generated questions are typically handed to a conversation session as
/// seed suggestions when the user adds a resource to the chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRequest {
    /// Identifier of the resource to ask about.
    pub resource_id: String,

    /// The resource title, for prompt context.
    pub resource_title: String,

    /// The resource summary, for prompt context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_summary: Option<String>,
}

impl QuestionRequest {
    /// Build a request from a catalog entry.
    pub fn for_resource(resource: &Resource) -> Self {
        Self {
            resource_id: resource.id.clone(),
            resource_title: resource.title.clone(),
            resource_summary: resource.summary.clone(),
        }
    }
}

/// Response body of the question generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReply {
    /// Generated questions, in display order.
    #[serde(default)]
    pub questions: Vec<String>,
}
