use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Response body of the single-shot chat endpoint.
///
/// This is the non-streaming fallback shape: one complete answer plus the
/// side-channel data that would otherwise arrive as stream events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The complete assistant answer.
    pub answer: String,

    /// Resources the answer drew on, if the backend reports them.
    #[serde(default)]
    pub sources: Vec<Resource>,

    /// Retrieval strategy the backend chose for this answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,

    /// Follow-up questions to offer the user.
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}
