use serde::{Deserialize, Serialize};

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single message in a conversation.
///
/// Messages are exclusively owned by the session that created them. An
/// assistant message starts life as an empty placeholder with `complete`
/// false and is appended to in place while its exchange streams; once a
/// terminal event, cancellation, or failure is applied it is complete and no
/// longer mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,

    /// The message text.
    pub content: String,

    /// Whether the message has finished arriving.
    pub complete: bool,
}

impl ChatMessage {
    /// Creates a complete user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            complete: true,
        }
    }

    /// Creates a complete assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            complete: true,
        }
    }

    /// Creates the empty assistant placeholder that opens an exchange.
    pub fn placeholder() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            complete: false,
        }
    }

    /// Appends streamed text to an in-progress message.
    pub fn push_text(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Marks the message as complete.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }
}

/// A message as submitted to the backend in the `history` array.
///
/// The backend reconstructs conversation context statelessly from this list,
/// so only the role and text travel over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// The role of the message author.
    pub role: Role,

    /// The message text.
    pub content: String,
}

impl From<&ChatMessage> for HistoryMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_starts_empty_and_incomplete() {
        let message = ChatMessage::placeholder();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.is_empty());
        assert!(!message.complete);
    }

    #[test]
    fn push_text_accumulates_in_order() {
        let mut message = ChatMessage::placeholder();
        message.push_text("Hel");
        message.push_text("lo");
        assert_eq!(message.content, "Hello");
    }

    #[test]
    fn history_message_serializes_roles_lowercase() {
        let history = HistoryMessage::from(&ChatMessage::user("hi"));
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }
}
