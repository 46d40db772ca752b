// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod sse;
pub mod types;
pub mod utils;

// Re-exports
pub use chat::{ConversationSession, RequestState};
pub use client::{ChatTransport, Librarius};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use sse::{FrameDecoder, StreamEventStream, decode_frames};
pub use types::*;
