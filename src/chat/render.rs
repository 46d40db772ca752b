//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows for
//! different output styles: ANSI-styled terminal output, unstyled output for
//! piping, or no output at all for headless use.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text (used for suggestion lists).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for cyan text (used for suggestion markers).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
///
/// A session calls into this as events arrive, so implementations see
/// partial progress without the session blocking on full completion.
pub trait Renderer: Send {
    /// Print a chunk of response text.
    ///
    /// This is called incrementally as tokens are streamed from the backend.
    fn print_text(&mut self, text: &str);

    /// Print a replacement suggestion list.
    fn print_suggestions(&mut self, suggestions: &[String]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the exchange is interrupted by the user.
    fn print_interrupted(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_suggestions(&mut self, suggestions: &[String]) {
        if suggestions.is_empty() {
            return;
        }
        println!();
        if self.use_color {
            println!("{ANSI_DIM}Suggested questions:{ANSI_RESET}");
            for suggestion in suggestions {
                println!("  {ANSI_CYAN}-{ANSI_RESET} {suggestion}");
            }
        } else {
            println!("Suggested questions:");
            for suggestion in suggestions {
                println!("  - {suggestion}");
            }
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        println!("\n[interrupted]");
        self.flush();
    }
}

/// Renderer that discards everything.
///
/// Useful when a session is driven headlessly and state is read back from
/// the session itself.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn print_text(&mut self, _text: &str) {}

    fn print_suggestions(&mut self, _suggestions: &[String]) {}

    fn print_error(&mut self, _error: &str) {}

    fn print_info(&mut self, _info: &str) {}

    fn finish_response(&mut self) {}

    fn print_interrupted(&mut self) {}
}
