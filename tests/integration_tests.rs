//! Integration tests for the librarius library.
//! These tests require a running backend; set LIBRARIUS_BASE_URL to run them.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use futures::StreamExt;

    use librarius::chat::{ChatConfig, ConversationSession, NullRenderer, RequestState};
    use librarius::{Librarius, StreamEvent};

    fn live_client() -> Option<Librarius> {
        let base_url = std::env::var("LIBRARIUS_BASE_URL").ok()?;
        Some(Librarius::new(Some(base_url)).expect("Failed to create client"))
    }

    #[tokio::test]
    async fn test_single_shot_chat() {
        let Some(client) = live_client() else {
            eprintln!("Skipping test: LIBRARIUS_BASE_URL not set");
            return;
        };

        let reply = client.send_chat("What is RAG?", &[]).await;
        let reply = reply.expect("Request should succeed against a live backend");
        assert!(!reply.answer.is_empty());
    }

    #[tokio::test]
    async fn test_streaming_chat_reaches_done() {
        let Some(client) = live_client() else {
            eprintln!("Skipping test: LIBRARIUS_BASE_URL not set");
            return;
        };

        let stream = client.stream_chat("What is RAG?", &[]).await;
        let mut stream = stream.expect("Stream request should succeed");

        let mut saw_token = false;
        let mut saw_done = false;
        while let Some(item) = stream.next().await {
            match item.expect("Stream should not error") {
                StreamEvent::Token { .. } => saw_token = true,
                StreamEvent::Done => saw_done = true,
                _ => {}
            }
        }
        assert!(saw_token, "Expected at least one token");
        assert!(saw_done, "Expected the stream to complete");
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let Some(client) = live_client() else {
            eprintln!("Skipping test: LIBRARIUS_BASE_URL not set");
            return;
        };

        let mut session = ConversationSession::new(client, ChatConfig::new());
        let mut renderer = NullRenderer;
        let interrupt = Arc::new(AtomicBool::new(false));

        session
            .send("What is RAG?", &mut renderer, interrupt)
            .await
            .expect("Input should be accepted");

        assert_eq!(session.state(), RequestState::Settled);
        let last = session.messages().last().expect("History should not be empty");
        assert!(last.complete);
        assert!(!last.content.is_empty());
    }

    #[tokio::test]
    async fn test_resource_listing() {
        let Some(client) = live_client() else {
            eprintln!("Skipping test: LIBRARIUS_BASE_URL not set");
            return;
        };

        let resources = client
            .list_resources(&librarius::ResourceFilters::all())
            .await;
        assert!(resources.is_ok(), "Listing should succeed");
    }
}
