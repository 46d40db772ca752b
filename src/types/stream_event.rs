use serde::{Deserialize, Serialize};

/// An event decoded from one frame of a streaming chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An incremental fragment of assistant output.
    Token {
        /// The fragment text, appended verbatim to the assistant message.
        text: String,
    },

    /// A replacement suggestion list.
    Suggestions {
        /// The new suggestions, in display order.
        items: Vec<String>,
    },

    /// Terminal marker; no further events follow for this exchange.
    Done,

    /// A frame whose payload failed to decode.
    ///
    /// Malformed frames are skipped, never fatal: the events around them are
    /// unaffected.
    Malformed {
        /// The raw payload text, kept for diagnostics.
        raw: String,
    },
}

impl StreamEvent {
    /// Check if this event terminates the exchange.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_is_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert!(
            !StreamEvent::Token {
                text: "hi".to_string()
            }
            .is_terminal()
        );
        assert!(
            !StreamEvent::Malformed {
                raw: "{".to_string()
            }
            .is_terminal()
        );
    }
}
