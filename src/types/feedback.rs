use serde::{Deserialize, Serialize};

/// The direction of a feedback vote.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    /// An upvote.
    Like,

    /// A downvote.
    Dislike,
}

/// Request body for submitting feedback on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// The vote direction.
    pub vote_type: VoteType,

    /// Optional free-form reason for the vote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FeedbackRequest {
    /// Create a feedback request with no reason attached.
    pub fn new(vote_type: VoteType) -> Self {
        Self {
            vote_type,
            reason: None,
        }
    }

    /// Attach a reason to the vote.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Acknowledgement returned by the feedback endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReply {
    /// Outcome marker, `"success"` on acceptance.
    pub status: String,

    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
}
