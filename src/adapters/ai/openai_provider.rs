//! OpenAI-compatible Provider - Implementation of AIProvider for any endpoint
//! speaking the OpenAI chat completions protocol.
//!
//! The default base URL is Gemini's OpenAI-compatible endpoint, but OpenAI
//! itself and local servers work the same way.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_base_url("https://generativelanguage.googleapis.com/v1beta/openai");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events (SSE). Network chunks do not respect line
//! boundaries, so bytes are buffered until a full line is available.
//! Each `data:` line is parsed into a `StreamChunk`; `[DONE]` ends the stream.
//!
//! The configured timeout bounds connecting, waiting for response headers
//! and each gap between body chunks. A long reply that keeps streaming is
//! never cut off.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
    TokenUsage,
};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Connect, first-byte and between-chunk timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a configuration from the application's AI section.
    pub fn from_app_config(config: &AiConfig) -> Result<Self, AIError> {
        let key = config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().clone())
            .filter(|k| !k.is_empty())
            .ok_or(AIError::AuthenticationFailed)?;
        Ok(Self::new(key)
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout()))
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the connect and idle timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to the wire format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: true,
            stream_options: StreamOptions { include_usage: true },
        }
    }

    /// Sends a streaming request.
    async fn send_streaming_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        let send = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send();

        tokio::time::timeout(self.config.timeout, send)
            .await
            .map_err(|_| AIError::Timeout)?
            .map_err(map_transport_error)
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(error_for_status(status.as_u16(), &error_body))
    }
}

fn map_transport_error(e: reqwest::Error) -> AIError {
    if e.is_timeout() {
        AIError::Timeout
    } else if e.is_connect() {
        AIError::network(format!("Connection failed: {}", e))
    } else {
        AIError::network(e.to_string())
    }
}

fn map_stream_error(e: reqwest::Error) -> AIError {
    if e.is_timeout() {
        AIError::Timeout
    } else {
        AIError::network(format!("Stream error: {}", e))
    }
}

/// Yields the inner stream's items until one takes longer than `idle` to
/// arrive, then yields `AIError::Timeout` once and ends.
fn idle_timeout<S>(inner: S, idle: Duration) -> impl Stream<Item = Result<S::Item, AIError>>
where
    S: Stream,
{
    stream::unfold(Some(Box::pin(inner)), move |state| async move {
        let mut inner = state?;
        match tokio::time::timeout(idle, inner.next()).await {
            Ok(Some(item)) => Some((Ok(item), Some(inner))),
            Ok(None) => None,
            Err(_) => Some((Err(AIError::Timeout), None)),
        }
    })
}

/// Maps a non-success HTTP status to an AIError.
fn error_for_status(status: u16, error_body: &str) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 => {
            if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded")
            {
                AIError::ContextTooLong(error_body.to_string())
            } else {
                AIError::InvalidRequest(error_body.to_string())
            }
        }
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Parses retry-after from error response.
fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            let msg = parsed.get("error")?.get("message")?.as_str()?.to_string();
            let idx = msg.find("try again in ")?;
            let rest = &msg[idx + 13..];
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            rest[..end].parse::<u32>().ok()
        })
        .unwrap_or(30)
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.send_streaming_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let stream = idle_timeout(response.bytes_stream(), self.config.timeout)
            .scan(SseLineBuffer::default(), |buffer, chunk_result| {
                let items = match chunk_result {
                    Ok(Ok(bytes)) => buffer
                        .push(&bytes)
                        .into_iter()
                        .filter_map(|line| parse_sse_line(&line))
                        .collect::<Vec<_>>(),
                    Ok(Err(e)) => vec![SseEvent::Item(Err(map_stream_error(e)))],
                    Err(timeout) => vec![SseEvent::Item(Err(timeout))],
                };
                futures::future::ready(Some(items))
            })
            .flat_map(stream::iter)
            .take_while(|event| futures::future::ready(!matches!(event, SseEvent::Done)))
            .filter_map(|event| async move {
                match event {
                    SseEvent::Item(item) => Some(item),
                    SseEvent::Done => None,
                }
            });

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

/// Accumulates bytes and yields complete lines.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Appends bytes and returns every line completed by them.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            lines.push(text.trim_end_matches(['\r', '\n']).to_string());
        }
        lines
    }
}

#[derive(Debug)]
enum SseEvent {
    Item(Result<StreamChunk, AIError>),
    Done,
}

/// Parses one SSE line. Comments, blank lines and events with nothing to
/// report yield `None`.
fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(SseEvent::Done);
    }
    if data.is_empty() {
        return None;
    }

    let chunk = match serde_json::from_str::<StreamResponseChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(SseEvent::Item(Err(AIError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))))
        }
    };

    if let Some(err) = chunk.error {
        return Some(SseEvent::Item(Err(AIError::unavailable(err.message))));
    }

    let usage = chunk
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
    let choice = chunk.choices.into_iter().next();
    let delta = choice
        .as_ref()
        .and_then(|c| c.delta.content.clone())
        .unwrap_or_default();
    let finish_reason = choice
        .and_then(|c| c.finish_reason)
        .map(|r| FinishReason::parse(&r));

    if delta.is_empty() && finish_reason.is_none() && usage.is_none() {
        return None;
    }

    Some(SseEvent::Item(Ok(StreamChunk {
        delta,
        finish_reason,
        usage,
    })))
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<OpenAIUsage>,
    error: Option<StreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ChatMessage;
    use crate::domain::foundation::{ThreadId, UserId};
    use crate::ports::RequestMetadata;

    fn parse_item(line: &str) -> Result<StreamChunk, AIError> {
        match parse_sse_line(line) {
            Some(SseEvent::Item(item)) => item,
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com/v1")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn config_from_app_config_requires_key() {
        let app = AiConfig::default();
        assert!(OpenAIConfig::from_app_config(&app).is_err());

        let app = AiConfig {
            api_key: Some(Secret::new("k".to_string())),
            model: "m".to_string(),
            ..Default::default()
        };
        let config = OpenAIConfig::from_app_config(&app).unwrap();
        assert_eq!(config.model, "m");
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = OpenAIConfig::new("k").with_base_url("http://localhost:1234/v1/");
        let provider = OpenAIProvider::new(config).unwrap();
        assert_eq!(provider.completions_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn request_keeps_message_order_and_roles() {
        let provider = OpenAIProvider::new(OpenAIConfig::new("k")).unwrap();
        let request = CompletionRequest::new(
            vec![
                ChatMessage::system("sys"),
                ChatMessage::user("q"),
                ChatMessage::assistant("a"),
            ],
            RequestMetadata::new(UserId::new("u").unwrap(), ThreadId::generate(), "t"),
        );

        let wire = serde_json::to_value(provider.to_openai_request(&request)).unwrap();

        let roles: Vec<_> = wire["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(wire["stream"], true);
        assert!(wire.get("max_tokens").is_none());
    }

    #[test]
    fn parse_sse_content_chunk() {
        let chunk = parse_item(
            r#"data: {"id":"c1","choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.delta, "Hello");
        assert!(!chunk.is_final());
    }

    #[test]
    fn parse_sse_finish_chunk_with_usage() {
        let chunk = parse_item(
            r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":9,"completion_tokens":3}}"#,
        )
        .unwrap();
        assert_eq!(chunk.finish_reason, Some(FinishReason::Stop));
        assert_eq!(chunk.usage, Some(TokenUsage::new(9, 3)));
        assert_eq!(chunk.reply_delta(), None);
    }

    #[test]
    fn parse_sse_usage_only_chunk() {
        let chunk = parse_item(
            r#"data: {"choices":[],"usage":{"prompt_tokens":1,"completion_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(chunk.usage, Some(TokenUsage::new(1, 2)));
    }

    #[test]
    fn parse_sse_done_marker() {
        assert!(matches!(parse_sse_line("data: [DONE]"), Some(SseEvent::Done)));
    }

    #[test]
    fn parse_sse_ignores_comments_and_empty_deltas() {
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#).is_none());
    }

    #[test]
    fn parse_sse_invalid_json_is_error() {
        assert!(matches!(parse_item("data: {not json"), Err(AIError::Parse(_))));
    }

    #[test]
    fn parse_sse_in_band_error() {
        let result = parse_item(r#"data: {"error":{"message":"overloaded"}}"#);
        assert_eq!(result, Err(AIError::unavailable("overloaded")));
    }

    #[test]
    fn line_buffer_joins_split_lines() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        let lines = buffer.push(b":1}\r\n\ndata: [DO");
        assert_eq!(lines, vec!["data: {\"a\":1}".to_string(), String::new()]);
        let lines = buffer.push(b"NE]\n");
        assert_eq!(lines, vec!["data: [DONE]".to_string()]);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(error_for_status(401, ""), AIError::AuthenticationFailed);
        assert!(matches!(error_for_status(429, ""), AIError::RateLimited { retry_after_secs: 30 }));
        assert!(matches!(
            error_for_status(400, "context_length_exceeded"),
            AIError::ContextTooLong(_)
        ));
        assert!(matches!(error_for_status(400, "bad"), AIError::InvalidRequest(_)));
        assert!(matches!(error_for_status(503, ""), AIError::Unavailable { .. }));
    }

    #[test]
    fn retry_after_is_parsed_from_message() {
        let body = r#"{"error":{"message":"Rate limit reached, try again in 12s."}}"#;
        assert_eq!(parse_retry_after(body), 12);
        assert_eq!(parse_retry_after("garbage"), 30);
    }

    #[tokio::test]
    async fn idle_timeout_passes_items_through() {
        let items: Vec<_> = idle_timeout(stream::iter([1, 2, 3]), Duration::from_secs(5))
            .collect()
            .await;

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn stalled_body_ends_with_timeout() {
        let stalled = stream::iter([1]).chain(stream::pending::<i32>());

        let items: Vec<_> = idle_timeout(stalled, Duration::from_millis(20))
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Ok(1)));
        assert!(matches!(items[1], Err(AIError::Timeout)));
    }

    #[tokio::test]
    async fn slow_but_steady_body_is_not_cut_off() {
        let steady = stream::iter(0..5).then(|i| async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            i
        });

        let items: Vec<_> = idle_timeout(steady, Duration::from_millis(500))
            .collect()
            .await;

        assert_eq!(items.len(), 5);
        assert!(items.iter().all(Result::is_ok));
    }
}
