//! Core conversation session management.
//!
//! This module provides the [`ConversationSession`] state machine which owns
//! conversation history, the active suggestion list, and the lifecycle of
//! the current exchange.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::chat::config::ChatConfig;
use crate::chat::render::Renderer;
use crate::client::ChatTransport;
use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{ChatMessage, HistoryMessage, Role, StreamEvent};

/// Lifecycle state of a session's current exchange.
///
/// The machine moves `Idle → Sending → Streaming → {Settled, Failed}`; a new
/// `send` restarts it from `Settled` or `Failed`. No transition skips
/// `Sending`: even an exchange that fails instantly passes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// No exchange has started yet.
    Idle,

    /// An exchange is open but no event has arrived.
    Sending,

    /// Events are arriving.
    Streaming,

    /// The last exchange completed (or was cancelled).
    Settled,

    /// The last exchange failed; the assistant message is annotated.
    Failed,
}

impl RequestState {
    /// True while an exchange is open.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::Sending | RequestState::Streaming)
    }
}

/// Aggregated statistics for a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of messages in the history, greeting included.
    pub message_count: usize,

    /// Number of suggestions currently offered.
    pub suggestion_count: usize,

    /// Number of exchanges opened over the session's lifetime.
    pub request_count: u64,

    /// Number of exchanges that ended in failure.
    pub failure_count: u64,

    /// The current request state.
    pub state: RequestState,
}

/// A conversation session backed by a chat transport.
///
/// The session is the sole owner of its messages and suggestions; all state
/// mutation happens through `&mut self`, so event application is serialized
/// by construction and token order always matches arrival order. At most one
/// exchange is open at a time: a `send` issued while a previous exchange is
/// still in flight finalizes it first.
pub struct ConversationSession<T: ChatTransport> {
    transport: T,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
    suggestions: Vec<String>,
    pending_input: Option<String>,
    state: RequestState,
    last_error: Option<Error>,
    request_count: u64,
    failure_count: u64,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl<T: ChatTransport> ConversationSession<T> {
    /// Creates a session seeded with the configured greeting and suggestions.
    pub fn new(transport: T, config: ChatConfig) -> Self {
        let messages = vec![ChatMessage::assistant(config.greeting.clone())];
        let suggestions = config.suggestions.clone();
        Self {
            transport,
            config,
            messages,
            suggestions,
            pending_input: None,
            state: RequestState::Idle,
            last_error: None,
            request_count: 0,
            failure_count: 0,
            logger: None,
        }
    }

    /// Attach a logger that observes completed assistant messages.
    pub fn set_logger(&mut self, logger: Arc<dyn ClientLogger>) {
        self.logger = Some(logger);
    }

    /// Applies late-arriving seed values from the surrounding surface.
    ///
    /// A seed message (for example "tell me about resource X") pre-fills the
    /// pending input rather than sending immediately; seed suggestions
    /// replace the current list. Neither touches messages the user may have
    /// already exchanged in the meantime.
    pub fn initialize(
        &mut self,
        seed_message: Option<String>,
        seed_suggestions: Option<Vec<String>>,
    ) {
        if let Some(seed_message) = seed_message {
            self.pending_input = Some(seed_message);
        }
        if let Some(seed_suggestions) = seed_suggestions {
            self.suggestions = seed_suggestions;
        }
    }

    /// The pre-filled input waiting to be sent, if any.
    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }

    /// Takes the pre-filled input, leaving none behind.
    pub fn take_pending_input(&mut self) -> Option<String> {
        self.pending_input.take()
    }

    /// The conversation history, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The current suggestion list.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The current request state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The error that failed the last exchange, if it failed.
    ///
    /// Transport failures are never re-raised from [`send`]; they surface
    /// here, alongside the completed failure-annotated assistant message.
    ///
    /// [`send`]: ConversationSession::send
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The effective configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.messages.len(),
            suggestion_count: self.suggestions.len(),
            request_count: self.request_count,
            failure_count: self.failure_count,
            state: self.state,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Finalizes any superseded in-flight exchange
    /// 2. Adds the user message and an assistant placeholder to history
    /// 3. Opens a streaming exchange with the prior history
    /// 4. Applies events in arrival order, rendering partial progress
    ///
    /// The `interrupt` flag is checked between events; once set, the
    /// exchange is finalized as cancelled with whatever content accumulated.
    ///
    /// # Errors
    ///
    /// Returns an error only for empty input, before any state changes.
    /// Transport failures complete the assistant message with either the
    /// partial content or the configured failure notice, move the session to
    /// [`RequestState::Failed`], and are exposed via
    /// [`last_error`](ConversationSession::last_error).
    pub async fn send(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
        interrupt: Arc<AtomicBool>,
    ) -> Result<()> {
        let history = self.begin_exchange(text)?;

        let mut stream = match self.transport.stream(text, &history).await {
            Ok(stream) => stream,
            Err(err) => {
                self.fail(err, renderer);
                return Ok(());
            }
        };

        if interrupt.load(Ordering::Relaxed) {
            self.cancel();
            renderer.print_interrupted();
            return Ok(());
        }

        while let Some(item) = stream.next().await {
            if interrupt.load(Ordering::Relaxed) {
                self.cancel();
                renderer.print_interrupted();
                return Ok(());
            }
            match item {
                Ok(event) => {
                    if self.state == RequestState::Sending {
                        self.state = RequestState::Streaming;
                    }
                    self.apply(&event);
                    match &event {
                        StreamEvent::Token { text } => renderer.print_text(text),
                        StreamEvent::Suggestions { items } => renderer.print_suggestions(items),
                        StreamEvent::Done => renderer.finish_response(),
                        StreamEvent::Malformed { .. } => {}
                    }
                    if event.is_terminal() {
                        self.log_settled_message();
                        return Ok(());
                    }
                }
                Err(err) => {
                    self.fail(err, renderer);
                    return Ok(());
                }
            }
        }

        // The event sequence itself reports truncation before ending; an
        // exhausted stream with the exchange still open means the transport
        // never did, so classify it here.
        if self.state.is_in_flight() {
            self.fail(
                Error::truncated_stream("stream ended without completion marker"),
                renderer,
            );
        }
        Ok(())
    }

    /// Sends a user message in the single-shot fallback mode.
    ///
    /// One request, one complete reply, no framing. The suggestion list is
    /// replaced only when the reply actually carries suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error only for empty input; transport failures behave as
    /// in [`send`](ConversationSession::send).
    pub async fn send_once(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<()> {
        let history = self.begin_exchange(text)?;

        match self.transport.send(text, &history).await {
            Ok(reply) => {
                if let Some(message) = self.current_assistant_mut() {
                    message.content = reply.answer.clone();
                    message.mark_complete();
                }
                renderer.print_text(&reply.answer);
                renderer.finish_response();
                if !reply.suggested_questions.is_empty() {
                    self.suggestions = reply.suggested_questions;
                    renderer.print_suggestions(&self.suggestions);
                }
                self.state = RequestState::Settled;
                self.log_settled_message();
            }
            Err(err) => self.fail(err, renderer),
        }
        Ok(())
    }

    /// Applies one decoded event to the session state.
    ///
    /// This is the only mutation path for message content and suggestions,
    /// and events must be applied in arrival order: token accumulation is
    /// not commutative.
    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Token { text } => {
                if let Some(message) = self.current_assistant_mut() {
                    message.push_text(text);
                }
            }
            StreamEvent::Suggestions { items } => {
                // Wholesale replacement; no merge or dedup against the prior
                // list.
                self.suggestions = items.clone();
            }
            StreamEvent::Done => {
                if let Some(message) = self.current_assistant_mut() {
                    message.mark_complete();
                }
                self.state = RequestState::Settled;
            }
            StreamEvent::Malformed { .. } => {}
        }
    }

    /// Finalizes an in-flight exchange as cancelled.
    ///
    /// The current assistant message is completed with whatever content has
    /// accumulated and the session settles. A no-op when nothing is in
    /// flight, so calling it again (or on a fresh session) changes nothing.
    /// Dropping the `send` future is what actually closes the underlying
    /// connection; this makes the session state consistent afterward.
    pub fn cancel(&mut self) {
        if !self.state.is_in_flight() {
            return;
        }
        observability::SESSION_CANCELS.click();
        if let Some(message) = self.current_assistant_mut() {
            message.mark_complete();
        }
        self.state = RequestState::Settled;
    }

    /// Discards the conversation and starts over from the greeting.
    pub fn reset(&mut self) {
        self.cancel();
        self.messages.clear();
        self.messages
            .push(ChatMessage::assistant(self.config.greeting.clone()));
        self.suggestions = self.config.suggestions.clone();
        self.pending_input = None;
        self.last_error = None;
        self.state = RequestState::Idle;
    }

    /// Validates input, finalizes any superseded exchange, and appends the
    /// user message plus the assistant placeholder.
    ///
    /// Returns the history to submit: everything up to but excluding the new
    /// user message, which travels separately.
    fn begin_exchange(&mut self, text: &str) -> Result<Vec<HistoryMessage>> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("message must not be empty"));
        }
        if self.state.is_in_flight() {
            self.cancel();
        }
        observability::SESSION_SENDS.click();
        self.request_count += 1;
        self.last_error = None;

        let history = self.messages.iter().map(HistoryMessage::from).collect();
        self.messages.push(ChatMessage::user(text));
        self.state = RequestState::Sending;
        self.messages.push(ChatMessage::placeholder());
        Ok(history)
    }

    /// The assistant message currently accepting streamed content.
    fn current_assistant_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|message| message.role == Role::Assistant && !message.complete)
    }

    /// Converts a transport failure into a terminal, user-visible state.
    ///
    /// An empty placeholder gets the fixed failure notice; partial content
    /// is kept as-is. Either way the message is completed, so the UI always
    /// has something coherent to render.
    fn fail(&mut self, error: Error, renderer: &mut dyn Renderer) {
        observability::SESSION_FAILURES.click();
        self.failure_count += 1;
        let notice = self.config.failure_notice.clone();
        if let Some(message) = self.current_assistant_mut() {
            if message.content.is_empty() {
                message.content = notice;
            }
            message.mark_complete();
        }
        renderer.print_error(&error.to_string());
        self.state = RequestState::Failed;
        self.last_error = Some(error);
    }

    fn log_settled_message(&self) {
        if let (Some(logger), Some(message)) = (&self.logger, self.messages.last()) {
            logger.log_stream_message(message);
        }
    }
}
