//! In-memory repositories.
//!
//! Same contracts as the SQLite adapters, held in process memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{ChatMessage, StoredMessage};
use crate::domain::document::{Document, NewDocument};
use crate::domain::foundation::{DocumentId, ThreadId, Timestamp, UserId};
use crate::domain::thread::Thread;
use crate::domain::user::User;
use crate::ports::{
    DocumentRepository, HistoryPage, HistoryStore, RepositoryError, ThreadRepository,
    UserRepository,
};

#[derive(Debug, Default)]
struct DocumentTables {
    next_id: i64,
    metadata: HashMap<DocumentId, Document>,
    text: HashMap<DocumentId, String>,
}

/// In-memory document repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    tables: Arc<RwLock<DocumentTables>>,
}

impl InMemoryDocumentRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the stored text of a document, keeping its metadata.
    pub async fn forget_text(&self, id: DocumentId) {
        self.tables.write().await.text.remove(&id);
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(
        &self,
        document: NewDocument,
        text: Option<&str>,
    ) -> Result<Document, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.next_id += 1;
        let document = document.with_id(DocumentId::new(tables.next_id));
        if let Some(text) = text {
            tables.text.insert(document.id, text.to_string());
        }
        tables.metadata.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        Ok(self.tables.read().await.metadata.get(&id).cloned())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Document>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut docs: Vec<_> = tables
            .metadata
            .values()
            .filter(|d| d.is_owned_by(owner))
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(docs)
    }

    async fn find_text(&self, id: DocumentId) -> Result<Option<String>, RepositoryError> {
        Ok(self.tables.read().await.text.get(&id).cloned())
    }

    async fn store_text(&self, id: DocumentId, text: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.metadata.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        tables.text.insert(id, text.to_string());
        Ok(())
    }
}

/// In-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        self.users.write().await.insert(user.id.clone());
        Ok(())
    }

    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self.users.read().await.contains(id))
    }
}

/// In-memory thread repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryThreadRepository {
    threads: Arc<RwLock<HashMap<ThreadId, Thread>>>,
}

impl InMemoryThreadRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored threads.
    pub async fn count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn create(&self, thread: &Thread) -> Result<(), RepositoryError> {
        let mut threads = self.threads.write().await;
        if threads.contains_key(&thread.id) {
            return Err(RepositoryError::Database(format!(
                "thread {} already exists",
                thread.id
            )));
        }
        threads.insert(thread.id.clone(), thread.clone());
        Ok(())
    }

    async fn find(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError> {
        Ok(self.threads.read().await.get(id).cloned())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Thread>, RepositoryError> {
        let threads = self.threads.read().await;
        let mut owned: Vec<_> = threads
            .values()
            .filter(|t| &t.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

/// In-memory history store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    messages: Arc<RwLock<HashMap<ThreadId, Vec<StoredMessage>>>>,
}

impl InMemoryHistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(
        &self,
        thread_id: &ThreadId,
        messages: &[ChatMessage],
    ) -> Result<(), RepositoryError> {
        let mut all = self.messages.write().await;
        let stored = all.entry(thread_id.clone()).or_default();
        let created_at = Timestamp::now();
        for message in messages {
            let sequence = stored.len() as i64 + 1;
            stored.push(StoredMessage {
                thread_id: thread_id.clone(),
                sequence,
                message: message.clone(),
                created_at,
            });
        }
        Ok(())
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<Vec<ChatMessage>, RepositoryError> {
        Ok(self
            .messages
            .read()
            .await
            .get(thread_id)
            .map(|stored| stored.iter().map(|s| s.message.clone()).collect())
            .unwrap_or_default())
    }

    async fn page(
        &self,
        thread_id: &ThreadId,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, RepositoryError> {
        let all = self.messages.read().await;
        let stored = all.get(thread_id).map(Vec::as_slice).unwrap_or_default();
        Ok(HistoryPage {
            messages: stored
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
            total: stored.len() as u64,
        })
    }
}
