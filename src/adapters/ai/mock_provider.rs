//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs. Each queued response
//! is an exact list of fragments, so tests can assert on what the client
//! receives byte for byte.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new().with_fragments(["Hel", "lo", " World"]);
//! // streams "Hel", "lo", " World", then a final chunk
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::MessageRole;
use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
    TokenUsage,
};

/// Mock AI provider for testing.
///
/// Configurable to return specific fragments, simulate delays, or inject errors.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency before each fragment.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Streams that were dropped before they finished.
    abandoned: Arc<AtomicUsize>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these fragments, then a final chunk.
    Fragments(Vec<String>),
    /// Stream these fragments, then fail mid-stream.
    FailAfter {
        fragments: Vec<String>,
        error: AIError,
    },
    /// Stream these fragments, then never finish.
    Stall(Vec<String>),
    /// Fail before any streaming starts.
    Error(AIError),
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn push(self, response: MockResponse) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
        self
    }

    /// Adds a response streamed as exactly these fragments.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Fragments(collect(fragments)))
    }

    /// Adds a response streamed word by word.
    pub fn with_response(self, content: impl AsRef<str>) -> Self {
        let fragments = split_words(content.as_ref());
        self.push(MockResponse::Fragments(fragments))
    }

    /// Adds a response that fails after emitting `fragments`.
    pub fn with_failure_after<I, S>(self, fragments: I, error: AIError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::FailAfter {
            fragments: collect(fragments),
            error,
        })
    }

    /// Adds a response that emits `fragments` and then hangs.
    pub fn with_stall<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Stall(collect(fragments)))
    }

    /// Adds an error returned before streaming starts.
    pub fn with_error(self, error: AIError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency before each fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the most recent call, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        self.calls.lock().ok().and_then(|c| c.last().cloned())
    }

    /// Number of streams dropped before reaching their end.
    pub fn abandoned_streams(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Gets the next response, or echoes the last user message.
    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        let queued = self.responses.lock().ok().and_then(|mut r| r.pop_front());
        queued.unwrap_or_else(|| {
            let last_user = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.content.as_str())
                .unwrap_or("");
            MockResponse::Fragments(split_words(&format!("Mock response to: {}", last_user)))
        })
    }
}

fn collect<I, S>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fragments.into_iter().map(Into::into).collect()
}

fn split_words(content: &str) -> Vec<String> {
    content.split_inclusive(' ').map(str::to_string).collect()
}

/// Counts the stream as abandoned unless it was marked finished first.
struct AbandonGuard {
    counter: Arc<AtomicUsize>,
    finished: bool,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.next_response(&request);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }

        let (fragments, tail) = match response {
            MockResponse::Error(err) => return Err(err),
            MockResponse::Fragments(f) => (f, Tail::Finish),
            MockResponse::FailAfter { fragments, error } => (fragments, Tail::Fail(error)),
            MockResponse::Stall(f) => (f, Tail::Stall),
        };

        let delay = self.delay;
        let completion_tokens = fragments.len() as u32;
        let guard = AbandonGuard {
            counter: Arc::clone(&self.abandoned),
            finished: false,
        };

        let body = stream::iter(fragments).then(move |fragment| async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            Ok::<_, AIError>(StreamChunk::content(fragment))
        });

        let end = stream::once(async move {
            let mut guard = guard;
            match tail {
                Tail::Finish => {
                    guard.finished = true;
                    Some(Ok(StreamChunk::final_chunk(
                        FinishReason::Stop,
                        Some(TokenUsage::new(10, completion_tokens)),
                    )))
                }
                Tail::Fail(err) => {
                    guard.finished = true;
                    Some(Err(err))
                }
                Tail::Stall => {
                    futures::future::pending::<()>().await;
                    None
                }
            }
        })
        .filter_map(|item| async move { item });

        Ok(Box::pin(body.chain(end)))
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

enum Tail {
    Finish,
    Fail(AIError),
    Stall,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ChatMessage;
    use crate::domain::foundation::{ThreadId, UserId};
    use crate::ports::RequestMetadata;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(
            vec![ChatMessage::user("Hello")],
            RequestMetadata::new(UserId::new("test-user").unwrap(), ThreadId::generate(), "trace"),
        )
    }

    async fn drain(stream: ChunkStream) -> (String, Vec<StreamChunk>, Option<AIError>) {
        let mut text = String::new();
        let mut chunks = Vec::new();
        let mut error = None;
        let mut stream = stream;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    text.push_str(&chunk.delta);
                    chunks.push(chunk);
                }
                Err(e) => error = Some(e),
            }
        }
        (text, chunks, error)
    }

    #[tokio::test]
    async fn streams_exact_fragments_then_final_chunk() {
        let provider = MockAIProvider::new().with_fragments(["Hel", "lo", " World"]);

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (text, chunks, error) = drain(stream).await;

        assert_eq!(text, "Hello World");
        assert_eq!(chunks.len(), 4);
        assert!(chunks[3].is_final());
        assert!(error.is_none());
        assert_eq!(provider.abandoned_streams(), 0);
    }

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let provider = MockAIProvider::new()
            .with_response("First answer")
            .with_response("Second");

        let (a, _, _) = drain(provider.stream_complete(test_request()).await.unwrap()).await;
        let (b, _, _) = drain(provider.stream_complete(test_request()).await.unwrap()).await;

        assert_eq!(a, "First answer");
        assert_eq!(b, "Second");
    }

    #[tokio::test]
    async fn default_response_echoes_last_user_message() {
        let provider = MockAIProvider::new();

        let (text, _, _) = drain(provider.stream_complete(test_request()).await.unwrap()).await;

        assert_eq!(text, "Mock response to: Hello");
    }

    #[tokio::test]
    async fn error_before_stream() {
        let provider = MockAIProvider::new().with_error(AIError::AuthenticationFailed);

        let result = provider.stream_complete(test_request()).await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn failure_mid_stream_after_fragments() {
        let provider = MockAIProvider::new()
            .with_failure_after(["partial"], AIError::network("reset"));

        let stream = provider.stream_complete(test_request()).await.unwrap();
        let (text, chunks, error) = drain(stream).await;

        assert_eq!(text, "partial");
        assert!(chunks.iter().all(|c| !c.is_final()));
        assert_eq!(error, Some(AIError::network("reset")));
    }

    #[tokio::test]
    async fn dropping_stalled_stream_counts_as_abandoned() {
        let provider = MockAIProvider::new().with_stall(["waiting"]);

        let mut stream = provider.stream_complete(test_request()).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.delta, "waiting");

        drop(stream);
        assert_eq!(provider.abandoned_streams(), 1);
    }

    #[tokio::test]
    async fn records_calls() {
        let provider = MockAIProvider::new();
        assert_eq!(provider.call_count(), 0);

        let _ = provider.stream_complete(test_request()).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        let call = provider.last_call().unwrap();
        assert_eq!(call.messages, vec![ChatMessage::user("Hello")]);
    }

    #[test]
    fn provider_info_is_mock() {
        assert_eq!(MockAIProvider::new().provider_info().name, "mock");
    }
}
