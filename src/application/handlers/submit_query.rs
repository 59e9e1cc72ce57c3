//! SubmitQueryHandler - resolves the thread for a `/query` call and starts
//! the turn.

use std::sync::Arc;

use thiserror::Error;

use crate::application::{ContextAssembler, ContextError, ConversationEngine, ConversationError, FragmentStream};
use crate::domain::conversation::Turn;
use crate::domain::foundation::{DocumentId, ThreadId, UserId};
use crate::domain::thread::Thread;
use crate::ports::{RepositoryError, RequestMetadata, ThreadRepository};

/// Command to submit one conversation turn.
#[derive(Debug, Clone)]
pub struct SubmitQueryCommand {
    pub user_id: UserId,
    /// Thread named by the client, if continuing one.
    pub thread_id: Option<ThreadId>,
    /// Document named in the body. Only used when starting a thread.
    pub pdf_id: Option<DocumentId>,
    pub turns: Vec<Turn>,
    /// Correlates provider logs with the HTTP request.
    pub trace_id: String,
}

/// A started turn.
#[derive(Debug)]
pub struct SubmitQueryResult {
    pub thread_id: ThreadId,
    /// True when this call created the thread.
    pub created: bool,
    pub fragments: FragmentStream,
}

/// Errors raised before streaming begins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Unknown thread, or a thread owned by another user.
    #[error("Thread not found")]
    ThreadNotFound,

    #[error("{0}")]
    ContextMissing(String),

    #[error("A response is already being generated for this thread")]
    TurnInProgress,

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl From<ContextError> for QueryError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Persistence(e) => QueryError::Persistence(e.to_string()),
            other => QueryError::ContextMissing(other.to_string()),
        }
    }
}

impl From<ConversationError> for QueryError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::TurnInProgress(_) => QueryError::TurnInProgress,
            ConversationError::Persistence(e) => QueryError::Persistence(e.to_string()),
        }
    }
}

impl From<RepositoryError> for QueryError {
    fn from(err: RepositoryError) -> Self {
        QueryError::Persistence(err.to_string())
    }
}

/// Handler for `/query`.
pub struct SubmitQueryHandler {
    threads: Arc<dyn ThreadRepository>,
    context: ContextAssembler,
    engine: ConversationEngine,
}

impl SubmitQueryHandler {
    pub fn new(
        threads: Arc<dyn ThreadRepository>,
        context: ContextAssembler,
        engine: ConversationEngine,
    ) -> Self {
        Self {
            threads,
            context,
            engine,
        }
    }

    pub async fn handle(&self, cmd: SubmitQueryCommand) -> Result<SubmitQueryResult, QueryError> {
        // 1. Resolve which thread and document this turn belongs to
        let (thread, created) = match &cmd.thread_id {
            Some(thread_id) => (self.existing_thread(&cmd, thread_id).await?, false),
            None => {
                let pdf_id = cmd.pdf_id.ok_or_else(|| {
                    QueryError::ContextMissing("pdf_id is required to start a thread".to_string())
                })?;
                (Thread::start(cmd.user_id.clone(), pdf_id), true)
            }
        };

        // 2. Build the model input; a bad document never creates a thread
        let assembled = self
            .context
            .assemble(&cmd.user_id, thread.document_id, &cmd.turns)
            .await?;

        // 3. Persist a new thread
        if created {
            self.threads.create(&thread).await?;
            tracing::info!(
                thread_id = %thread.id,
                user_id = %cmd.user_id,
                document_id = %thread.document_id,
                "Thread created"
            );
        }

        // 4. Start the turn
        let metadata = RequestMetadata::new(cmd.user_id, thread.id.clone(), cmd.trace_id);
        let fragments = self.engine.submit_turn(&thread.id, assembled, metadata).await?;

        Ok(SubmitQueryResult {
            thread_id: thread.id,
            created,
            fragments,
        })
    }

    async fn existing_thread(
        &self,
        cmd: &SubmitQueryCommand,
        thread_id: &ThreadId,
    ) -> Result<Thread, QueryError> {
        let thread = self
            .threads
            .find(thread_id)
            .await?
            .ok_or(QueryError::ThreadNotFound)?;

        thread.authorize(&cmd.user_id).map_err(|_| {
            tracing::warn!(thread_id = %thread_id, user_id = %cmd.user_id, "Foreign thread id");
            QueryError::ThreadNotFound
        })?;

        let effective = thread.effective_document(cmd.pdf_id);
        if let Some(requested) = cmd.pdf_id.filter(|id| *id != effective) {
            tracing::debug!(
                thread_id = %thread_id,
                requested = %requested,
                bound = %effective,
                "Ignoring pdf_id that differs from the thread's document"
            );
        }
        Ok(thread)
    }
}
