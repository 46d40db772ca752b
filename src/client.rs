use std::env;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability;
use crate::sse::{StreamEventStream, decode_frames};
use crate::types::{
    ChatReply, ChatRequest, FeedbackReply, FeedbackRequest, HistoryMessage, QuestionReply,
    QuestionRequest, Resource, ResourceFilters, ResourceStats,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The transport seam between a conversation session and the network.
///
/// [`Librarius`] is the production implementation; tests drive sessions with
/// synthetic transports so no live backend is needed.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open a streaming exchange for one new message.
    ///
    /// The prior history travels with the request so the backend can
    /// reconstruct context statelessly. Fails before producing any event if
    /// the exchange cannot be established.
    async fn stream(&self, message: &str, history: &[HistoryMessage]) -> Result<StreamEventStream>;

    /// Perform one single-shot exchange, the non-streaming fallback mode.
    async fn send(&self, message: &str, history: &[HistoryMessage]) -> Result<ChatReply>;
}

/// Client for the librarius resource-library assistant API.
#[derive(Clone)]
pub struct Librarius {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl std::fmt::Debug for Librarius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Librarius")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Librarius {
    /// Create a new librarius client.
    ///
    /// The base URL can be provided directly or read from the
    /// LIBRARIUS_BASE_URL environment variable; without either, the local
    /// development default is used.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var("LIBRARIUS_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut base_url = base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes replies and stream events.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a reqwest-level failure to our Error type.
    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        // FastAPI-style error bodies carry a single `detail` field.
        #[derive(Deserialize)]
        struct ErrorResponse {
            detail: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            408 => Error::timeout(message, None),
            _ => Error::api(status_code, message, request_id),
        }
    }

    async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        observability::CLIENT_REQUESTS.click();
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: Option<&ResourceFilters>,
    ) -> Result<T> {
        observability::CLIENT_REQUESTS.click();
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).headers(self.default_headers());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await.map_err(|e| {
            observability::CLIENT_REQUEST_ERRORS.click();
            self.map_request_error(e)
        })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send a chat message and get a single, complete reply.
    ///
    /// This is the non-streaming fallback mode: no framing, one JSON body.
    pub async fn send_chat(&self, message: &str, history: &[HistoryMessage]) -> Result<ChatReply> {
        let request = ChatRequest::new(message, history.to_vec());
        let response = self.post_json("chat", &request).await?;
        let reply = response.json::<ChatReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        if let Some(logger) = &self.logger {
            logger.log_reply(&reply);
        }
        Ok(reply)
    }

    /// Send a chat message and get a streaming reply.
    ///
    /// Returns a lazy sequence of [`StreamEvent`]s decoded from the response
    /// body as it arrives. The sequence ends after the `Done` event; a body
    /// that ends without one yields the decoded events followed by a
    /// [`Error::TruncatedStream`].
    ///
    /// [`StreamEvent`]: crate::types::StreamEvent
    pub async fn stream_chat(
        &self,
        message: &str,
        history: &[HistoryMessage],
    ) -> Result<StreamEventStream> {
        observability::CLIENT_REQUESTS.click();
        let request = ChatRequest::new(message, history.to_vec());
        let url = format!("{}chat/stream", self.base_url);

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        let timeout = self.timeout;
        let byte_stream = response.bytes_stream().map(move |result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Stream timed out: {}", e),
                        Some(timeout.as_secs_f64()),
                    )
                } else {
                    Error::connection(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
                }
            })
        });

        let logger = self.logger.clone();
        let event_stream = decode_frames(Box::pin(byte_stream)).map(move |item| {
            if let (Some(logger), Ok(event)) = (&logger, &item) {
                logger.log_stream_event(event);
            }
            item
        });

        Ok(Box::pin(event_stream))
    }

    /// List resources from the catalog.
    pub async fn list_resources(&self, filters: &ResourceFilters) -> Result<Vec<Resource>> {
        self.get_json("resources/", Some(filters)).await
    }

    /// Fetch per-category resource counts.
    pub async fn resource_stats(&self) -> Result<ResourceStats> {
        self.get_json("resources/stats", None).await
    }

    /// Submit like/dislike feedback for a resource.
    pub async fn submit_feedback(
        &self,
        resource_id: &str,
        feedback: &FeedbackRequest,
    ) -> Result<FeedbackReply> {
        let path = format!("resources/{}/feedback", resource_id);
        let response = self.post_json(&path, feedback).await?;
        response.json::<FeedbackReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Generate seed questions for a resource.
    ///
    /// The result is typically passed to
    /// [`ConversationSession::initialize`](crate::chat::ConversationSession::initialize)
    /// when a resource is added to the chat.
    pub async fn generate_questions(&self, request: &QuestionRequest) -> Result<QuestionReply> {
        let response = self.post_json("chat/generate_questions", request).await?;
        response.json::<QuestionReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl ChatTransport for Librarius {
    async fn stream(&self, message: &str, history: &[HistoryMessage]) -> Result<StreamEventStream> {
        self.stream_chat(message, history).await
    }

    async fn send(&self, message: &str, history: &[HistoryMessage]) -> Result<ChatReply> {
        self.send_chat(message, history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = Librarius::new(Some("http://example.com/api/v1".to_string())).unwrap();
        assert_eq!(client.base_url(), "http://example.com/api/v1/");
    }

    #[test]
    fn base_url_must_parse() {
        assert!(Librarius::new(Some("not a url".to_string())).is_err());
    }
}
