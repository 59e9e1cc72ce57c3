//! Conversation engine.
//!
//! Owns one turn at a time per thread: persists the incoming turns, builds
//! the model context from the thread's history, and streams the reply back
//! through a bounded channel while a background task drives the provider.
//!
//! ```text
//!  submit_turn ──► append turns ──► load history ──► window ──┐
//!                                                             ▼
//!  FragmentStream ◄── mpsc ◄── model task ◄── provider.stream_complete
//!                                  │
//!                                  └─► append reply (clean completion only)
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio_stream::wrappers::ReceiverStream;

use crate::config::{AiConfig, ConversationConfig};
use crate::domain::conversation::{AssembledTurn, ChatMessage, ContextConfig, ContextWindowManager};
use crate::domain::foundation::ThreadId;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, HistoryStore, RepositoryError, RequestMetadata,
};

/// Errors raised before any fragment is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("A turn is already in progress for thread {0}")]
    TurnInProgress(ThreadId),

    #[error("Failed to persist conversation: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Settings for the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Capacity of the fragment channel.
    pub fragment_buffer: usize,
    /// Sampling temperature passed to the provider.
    pub temperature: Option<f32>,
    /// Reply length cap passed to the provider.
    pub max_tokens: Option<u32>,
    /// History window applied before each model call.
    pub context: ContextConfig,
}

impl EngineSettings {
    /// Builds settings from the application configuration sections.
    pub fn from_config(conversation: &ConversationConfig, ai: &AiConfig) -> Self {
        Self {
            fragment_buffer: conversation.fragment_buffer.max(1),
            temperature: Some(ai.temperature),
            max_tokens: ai.max_tokens,
            context: ContextConfig::from(conversation),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default(), &AiConfig::default())
    }
}

/// Reply fragments for one turn, in generation order.
///
/// Ends cleanly when the reply is complete. A provider failure surfaces as
/// a final `Err` item.
pub struct FragmentStream {
    inner: ReceiverStream<Result<String, AIError>>,
}

impl FragmentStream {
    fn new(rx: mpsc::Receiver<Result<String, AIError>>) -> Self {
        Self {
            inner: ReceiverStream::new(rx),
        }
    }

    /// Drains the stream into one string, stopping at the first error.
    pub async fn collect_reply(mut self) -> Result<String, AIError> {
        let mut reply = String::new();
        while let Some(item) = self.next().await {
            reply.push_str(&item?);
        }
        Ok(reply)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String, AIError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl std::fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStream").finish_non_exhaustive()
    }
}

type TurnLocks = Arc<Mutex<HashMap<ThreadId, Arc<Mutex<()>>>>>;

/// Drives conversation turns.
#[derive(Clone)]
pub struct ConversationEngine {
    provider: Arc<dyn AIProvider>,
    history: Arc<dyn HistoryStore>,
    window: Arc<ContextWindowManager>,
    settings: EngineSettings,
    locks: TurnLocks,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        history: Arc<dyn HistoryStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            history,
            window: Arc::new(ContextWindowManager::new(settings.context.clone())),
            settings,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submits one turn on `thread_id`.
    ///
    /// Returns as soon as the model task is spawned; the model is called from
    /// inside the task. Fails with `TurnInProgress` if the thread already has
    /// a turn in flight.
    pub async fn submit_turn(
        &self,
        thread_id: &ThreadId,
        assembled: AssembledTurn,
        metadata: RequestMetadata,
    ) -> Result<FragmentStream, ConversationError> {
        let guard = self.try_acquire(thread_id).await?;

        let request = match self.prepare_request(thread_id, &assembled, metadata).await {
            Ok(request) => request,
            Err(e) => {
                release(&self.locks, thread_id, guard).await;
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::channel(self.settings.fragment_buffer);
        let task = TurnTask {
            provider: Arc::clone(&self.provider),
            history: Arc::clone(&self.history),
            locks: Arc::clone(&self.locks),
            thread_id: thread_id.clone(),
        };
        tokio::spawn(task.run(request, tx, guard));

        Ok(FragmentStream::new(rx))
    }

    /// Returns true if `thread_id` has a turn in flight.
    pub async fn is_busy(&self, thread_id: &ThreadId) -> bool {
        let locks = self.locks.lock().await;
        locks
            .get(thread_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    async fn try_acquire(
        &self,
        thread_id: &ThreadId,
    ) -> Result<OwnedMutexGuard<()>, ConversationError> {
        let mut locks = self.locks.lock().await;
        let lock = Arc::clone(locks.entry(thread_id.clone()).or_default());
        lock.try_lock_owned().map_err(|_| {
            tracing::info!(thread_id = %thread_id, "Rejected concurrent turn");
            ConversationError::TurnInProgress(thread_id.clone())
        })
    }

    async fn prepare_request(
        &self,
        thread_id: &ThreadId,
        assembled: &AssembledTurn,
        metadata: RequestMetadata,
    ) -> Result<CompletionRequest, ConversationError> {
        self.history.append(thread_id, &assembled.turns).await?;
        let history = self.history.load(thread_id).await?;

        let context = self.window.build_context(&assembled.preamble, &history);
        if context.was_truncated() {
            tracing::debug!(
                thread_id = %thread_id,
                truncated = context.truncated_count,
                "History window applied"
            );
        }

        let mut request =
            CompletionRequest::new(context.messages, metadata).with_max_tokens(self.settings.max_tokens);
        if let Some(temperature) = self.settings.temperature {
            request = request.with_temperature(temperature);
        }
        Ok(request)
    }
}

/// Releases a turn lock and forgets the thread's entry once nobody holds it.
async fn release(locks: &TurnLocks, thread_id: &ThreadId, guard: OwnedMutexGuard<()>) {
    let mut locks = locks.lock().await;
    drop(guard);
    if locks
        .get(thread_id)
        .is_some_and(|lock| Arc::strong_count(lock) == 1)
    {
        locks.remove(thread_id);
    }
}

enum TurnOutcome {
    Completed(String),
    Failed(AIError),
    Abandoned,
}

struct TurnTask {
    provider: Arc<dyn AIProvider>,
    history: Arc<dyn HistoryStore>,
    locks: TurnLocks,
    thread_id: ThreadId,
}

impl TurnTask {
    async fn run(
        self,
        request: CompletionRequest,
        tx: mpsc::Sender<Result<String, AIError>>,
        guard: OwnedMutexGuard<()>,
    ) {
        let outcome = tokio::select! {
            outcome = forward_reply(self.provider.as_ref(), request, &tx) => outcome,
            _ = tx.closed() => TurnOutcome::Abandoned,
        };

        match outcome {
            TurnOutcome::Completed(reply) if reply.is_empty() => {
                tracing::warn!(thread_id = %self.thread_id, "Model returned an empty reply");
            }
            TurnOutcome::Completed(reply) => {
                let chars = reply.chars().count();
                if let Err(e) = self
                    .history
                    .append(&self.thread_id, &[ChatMessage::assistant(reply)])
                    .await
                {
                    tracing::error!(thread_id = %self.thread_id, error = %e, "Failed to persist reply");
                } else {
                    tracing::debug!(thread_id = %self.thread_id, chars, "Turn completed");
                }
            }
            TurnOutcome::Failed(e) => {
                tracing::warn!(thread_id = %self.thread_id, error = %e, "Model stream failed");
                let _ = tx.send(Err(e)).await;
            }
            TurnOutcome::Abandoned => {
                tracing::info!(thread_id = %self.thread_id, "Client went away, turn abandoned");
            }
        }

        // The lock goes before the channel closes, so a client that saw the
        // end of the body can submit its next turn straight away.
        release(&self.locks, &self.thread_id, guard).await;
        drop(tx);
    }
}

async fn forward_reply(
    provider: &dyn AIProvider,
    request: CompletionRequest,
    tx: &mpsc::Sender<Result<String, AIError>>,
) -> TurnOutcome {
    let mut stream = match provider.stream_complete(request).await {
        Ok(stream) => stream,
        Err(e) => return TurnOutcome::Failed(e),
    };

    let mut reply = String::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                if let Some(delta) = chunk.reply_delta() {
                    reply.push_str(delta);
                    if tx.send(Ok(delta.to_string())).await.is_err() {
                        return TurnOutcome::Abandoned;
                    }
                }
            }
            Err(e) => return TurnOutcome::Failed(e),
        }
    }

    TurnOutcome::Completed(reply)
}
