use serde::{Deserialize, Serialize};

use crate::types::HistoryMessage;

/// Request body for both the streaming and single-shot chat endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,

    /// Prior conversation messages, oldest first.
    ///
    /// The new message and its placeholder reply are not part of the history;
    /// the backend appends them itself.
    pub history: Vec<HistoryMessage>,
}

impl ChatRequest {
    /// Create a request for the given message and history.
    pub fn new(message: impl Into<String>, history: Vec<HistoryMessage>) -> Self {
        Self {
            message: message.into(),
            history,
        }
    }
}
