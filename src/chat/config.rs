//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior. Defaults can come from a YAML
//! file; command-line flags win over it.

use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default canned greeting that opens every conversation.
const DEFAULT_GREETING: &str = "Hi! I'm the library assistant. I can help you find resources or answer questions about AI. Try asking \"How do I use LangChain?\"";

/// Default suggested questions shown before the backend supplies its own.
const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "How do I use LangChain?",
    "Recommend open-source AI projects",
    "What is RAG?",
    "How do agents work?",
];

/// Fixed notice shown when an exchange fails before producing any output.
const DEFAULT_FAILURE_NOTICE: &str = "Sorry, something went wrong. Please try again.";

/// Command-line arguments for the librarius-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: http://localhost:8000/api/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout: Option<u32>,

    /// YAML file with chat defaults.
    #[arrrg(optional, "YAML config file with chat defaults", "PATH")]
    pub config: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Use the single-shot fallback mode instead of streaming.
    #[arrrg(flag, "Use the single-shot fallback mode instead of streaming")]
    pub no_stream: bool,
}

/// Configuration for a conversation session and the chat binary around it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Backend base URL; `None` lets the client pick its default.
    pub base_url: Option<String>,

    /// Request timeout; `None` lets the client pick its default.
    pub timeout: Option<Duration>,

    /// The canned assistant greeting seeded into a fresh history.
    pub greeting: String,

    /// The suggestion list a session starts out with.
    pub suggestions: Vec<String>,

    /// The fixed notice substituted when an exchange fails with no output.
    pub failure_notice: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to use the streaming endpoint or the single-shot fallback.
    pub streaming: bool,
}

/// YAML file shape for chat defaults. All fields optional.
#[derive(Debug, Deserialize)]
struct ChatConfigFile {
    base_url: Option<String>,
    greeting: Option<String>,
    suggestions: Option<Vec<String>>,
    failure_notice: Option<String>,
}

impl ChatConfig {
    /// Creates a ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            greeting: DEFAULT_GREETING.to_string(),
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
            use_color: true,
            streaming: true,
        }
    }

    /// Loads defaults from a YAML file, falling back to built-ins for any
    /// field the file omits.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read chat config file", err))?;
        let file: ChatConfigFile = serde_yaml::from_str(&text).map_err(|err| {
            Error::serialization("failed to parse chat config file", Some(Box::new(err)))
        })?;
        let mut config = Self::new();
        if let Some(base_url) = file.base_url {
            config.base_url = Some(base_url);
        }
        if let Some(greeting) = file.greeting {
            config.greeting = greeting;
        }
        if let Some(suggestions) = file.suggestions {
            config.suggestions = suggestions;
        }
        if let Some(failure_notice) = file.failure_notice {
            config.failure_notice = failure_notice;
        }
        Ok(config)
    }

    /// Resolves the effective configuration from command-line arguments.
    pub fn resolve(args: &ChatArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        if let Some(base_url) = &args.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(timeout) = args.timeout {
            config.timeout = Some(Duration::from_secs(u64::from(timeout)));
        }
        if args.no_color {
            config.use_color = false;
        }
        if args.no_stream {
            config.streaming = false;
        }
        Ok(config)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert!(config.streaming);
        assert!(config.use_color);
        assert_eq!(config.suggestions.len(), 4);
        assert!(!config.greeting.is_empty());
        assert!(!config.failure_notice.is_empty());
    }

    #[test]
    fn args_override_defaults() {
        let args = ChatArgs {
            base_url: Some("http://example.com/api/v1/".to_string()),
            timeout: Some(5),
            config: None,
            no_color: true,
            no_stream: true,
        };
        let config = ChatConfig::resolve(&args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://example.com/api/v1/"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert!(!config.use_color);
        assert!(!config.streaming);
    }

    #[test]
    fn yaml_fields_fill_in() {
        let yaml = "greeting: Hello there\nsuggestions:\n  - one\n  - two\n";
        let file: ChatConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.greeting.as_deref(), Some("Hello there"));
        assert_eq!(file.suggestions.as_ref().map(|s| s.len()), Some(2));
        assert!(file.base_url.is_none());
    }
}
