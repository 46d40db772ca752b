// Public modules
pub mod chat_reply;
pub mod chat_request;
pub mod feedback;
pub mod message;
pub mod questions;
pub mod resource;
pub mod resource_filters;
pub mod resource_stats;
pub mod stream_event;

// Re-exports
pub use chat_reply::ChatReply;
pub use chat_request::ChatRequest;
pub use feedback::{FeedbackReply, FeedbackRequest, VoteType};
pub use message::{ChatMessage, HistoryMessage, Role};
pub use questions::{QuestionReply, QuestionRequest};
pub use resource::{Resource, ResourceKind};
pub use resource_filters::ResourceFilters;
pub use resource_stats::ResourceStats;
pub use stream_event::StreamEvent;
