//! Logging trait for librarius client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture and log all chat traffic passing through the [`Librarius`] client.
//!
//! [`Librarius`]: crate::Librarius

use crate::types::{ChatMessage, ChatReply, StreamEvent};

/// A trait for logging librarius client operations.
///
/// Implement this trait to capture and record chat traffic, including both
/// single-shot replies and individual streaming events.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Mutex;
/// use std::io::Write;
///
/// use librarius::{ChatMessage, ChatReply, ClientLogger, StreamEvent};
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_reply(&self, reply: &ChatReply) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Reply: {}", serde_json::to_string(reply).unwrap()).unwrap();
///     }
///
///     fn log_stream_event(&self, event: &StreamEvent) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Stream event: {}", serde_json::to_string(event).unwrap()).unwrap();
///     }
///
///     fn log_stream_message(&self, message: &ChatMessage) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Stream complete: {}", serde_json::to_string(message).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a complete reply from a single-shot chat call.
    ///
    /// This method is called once per successful fallback-mode exchange with
    /// the full [`ChatReply`] from the backend.
    fn log_reply(&self, reply: &ChatReply);

    /// Log an individual streaming event.
    ///
    /// This method is called for each [`StreamEvent`] applied during a
    /// streaming exchange, including malformed frames that were skipped.
    fn log_stream_event(&self, event: &StreamEvent);

    /// Log the reconstructed message from a completed stream.
    ///
    /// This method is called once when a streaming exchange settles, with the
    /// assistant [`ChatMessage`] accumulated from all of its token events.
    fn log_stream_message(&self, message: &ChatMessage);
}
