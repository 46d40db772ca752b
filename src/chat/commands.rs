//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages to
//! the backend.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Reset the conversation to its initial greeting.
    Clear,

    /// Show the current suggested questions.
    Suggestions,

    /// Switch between streaming and single-shot fallback mode.
    Stream(bool),

    /// Display session statistics (message count, request count, etc.).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// The input looked like a command but could not be parsed.
    Invalid(String),
}

/// Parses a line of input into a command, if it is one.
///
/// Returns `None` for regular messages that should be sent to the backend.
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    let parsed = match command {
        "/clear" => ChatCommand::Clear,
        "/suggestions" => ChatCommand::Suggestions,
        "/stream" => match rest {
            "on" => ChatCommand::Stream(true),
            "off" => ChatCommand::Stream(false),
            _ => ChatCommand::Invalid("usage: /stream on|off".to_string()),
        },
        "/stats" => ChatCommand::Stats,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("unknown command: {command} (try /help)")),
    };
    Some(parsed)
}

/// Help text listing the available commands.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     /clear          Reset the conversation\n\
     /suggestions    Show the current suggested questions\n\
     /stream on|off  Toggle streaming vs single-shot replies\n\
     /stats          Show session statistics\n\
     /help           Show this help\n\
     /quit           Exit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_messages_are_not_commands() {
        assert!(parse_command("hello there").is_none());
        assert!(parse_command("what is / about?").is_none());
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /stats  "), Some(ChatCommand::Stats));
    }

    #[test]
    fn parses_stream_toggle() {
        assert_eq!(parse_command("/stream on"), Some(ChatCommand::Stream(true)));
        assert_eq!(parse_command("/stream off"), Some(ChatCommand::Stream(false)));
        assert!(matches!(
            parse_command("/stream sideways"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
