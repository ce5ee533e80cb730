//! Document store behind the todo service.
//!
//! # Design
//! `TodoStore` is the persistence driver contract: insert with a generated id,
//! find with a filter and a fixed newest-first sort, and find-and-update /
//! find-and-delete by id that return `None` when nothing matched. The service
//! only ever talks to `Arc<dyn TodoStore>`, so tests can swap in a failing
//! store without touching the HTTP layer.
//!
//! `MemoryStore` keeps documents in insertion order behind a
//! `tokio::sync::RwLock`. Every write holds the lock for its whole duration,
//! which makes each single-document write atomic and leaves concurrent writers
//! to the same document last-write-wins. When opened with a snapshot path the
//! full document list is rewritten to that file after each mutation (temp file
//! then rename). A failed snapshot write rolls the mutation back.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{NewTodo, Priority, Todo, TodoPatch};

/// Persistence operations the todo service relies on.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a new document, assigning its id and creation time.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StorageError>;

    /// All documents matching `priority` (or all of them), newest first.
    async fn find(&self, priority: Option<Priority>) -> Result<Vec<Todo>, StorageError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StorageError>;

    /// Merge `patch` onto the document with `id` and return the updated document.
    async fn find_by_id_and_update(
        &self,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StorageError>;

    /// Remove the document with `id` and return it.
    async fn find_by_id_and_delete(&self, id: Uuid) -> Result<Option<Todo>, StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Todo>>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// A purely in-memory store; contents are lost on drop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON snapshot at `path`. A missing file is an
    /// empty store; the file is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let docs: Vec<Todo> = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), count = docs.len(), "opened todo snapshot");
        Ok(Self {
            docs: RwLock::new(docs),
            snapshot: Some(path),
        })
    }

    async fn persist(&self, docs: &[Todo]) -> Result<(), StorageError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(docs)?;
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), count = docs.len(), "wrote todo snapshot");
        Ok(())
    }

    /// Run `mutate` against a copy of the documents and keep the result only
    /// if it matched something and the snapshot (if any) was written.
    async fn commit<R, F>(&self, mutate: F) -> Result<Option<R>, StorageError>
    where
        F: FnOnce(&mut Vec<Todo>) -> Option<R> + Send,
        R: Send,
    {
        let mut docs = self.docs.write().await;
        let mut next = docs.clone();
        let Some(out) = mutate(&mut next) else {
            return Ok(None);
        };
        self.persist(&next).await?;
        *docs = next;
        Ok(Some(out))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, new: NewTodo) -> Result<Todo, StorageError> {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: new.title,
            completed: new.completed,
            priority: new.priority,
            created_at: Utc::now(),
        };
        let stored = todo.clone();
        self.commit(move |docs| {
            docs.push(todo);
            Some(())
        })
        .await?;
        Ok(stored)
    }

    async fn find(&self, priority: Option<Priority>) -> Result<Vec<Todo>, StorageError> {
        let docs = self.docs.read().await;
        // Newest insertion first, so the stable sort below keeps that order
        // among equal timestamps.
        let mut found: Vec<Todo> = docs
            .iter()
            .rev()
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StorageError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_id_and_update(
        &self,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StorageError> {
        self.commit(move |docs| {
            let todo = docs.iter_mut().find(|t| t.id == id)?;
            patch.apply(todo);
            Some(todo.clone())
        })
        .await
    }

    async fn find_by_id_and_delete(&self, id: Uuid) -> Result<Option<Todo>, StorageError> {
        self.commit(move |docs| {
            let pos = docs.iter().position(|t| t.id == id)?;
            Some(docs.remove(pos))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str, priority: Priority) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            completed: false,
            priority,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let todo = store.insert(new_todo("a", Priority::Normal)).await.unwrap();
        assert!(!todo.id.is_nil());
        assert!(todo.created_at >= before);
        assert_eq!(store.find(None).await.unwrap(), vec![todo]);
    }

    #[tokio::test]
    async fn find_returns_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(new_todo("first", Priority::Normal)).await.unwrap();
        let second = store.insert(new_todo("second", Priority::Medium)).await.unwrap();
        let third = store.insert(new_todo("third", Priority::Normal)).await.unwrap();

        let ids: Vec<Uuid> = store.find(None).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn find_filters_by_priority() {
        let store = MemoryStore::new();
        store.insert(new_todo("a", Priority::Normal)).await.unwrap();
        let medium = store.insert(new_todo("b", Priority::Medium)).await.unwrap();

        assert_eq!(store.find(Some(Priority::Medium)).await.unwrap(), vec![medium]);
        assert!(store.find(Some(Priority::Extreme)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_missing_id_return_none() {
        let store = MemoryStore::new();
        let kept = store.insert(new_todo("a", Priority::Normal)).await.unwrap();
        let patch = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };

        assert!(store
            .find_by_id_and_update(Uuid::new_v4(), patch)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_id_and_delete(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.find(None).await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn delete_returns_removed_document() {
        let store = MemoryStore::new();
        let todo = store.insert(new_todo("a", Priority::Extreme)).await.unwrap();
        let removed = store.find_by_id_and_delete(todo.id).await.unwrap();
        assert_eq!(removed, Some(todo));
        assert!(store.find(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let a = store.insert(new_todo("a", Priority::Normal)).await.unwrap();
        let b = store.insert(new_todo("b", Priority::Medium)).await.unwrap();
        let patch = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };
        store.find_by_id_and_update(a.id, patch).await.unwrap();
        drop(store);

        let reopened = MemoryStore::open(&path).await.unwrap();
        let todos = reopened.find(None).await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0], b);
        assert!(todos[1].completed);
    }

    #[tokio::test]
    async fn failed_snapshot_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("todos.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let err = store.insert(new_todo("a", Priority::Normal)).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(store.find(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_snapshot_write_keeps_update_and_delete_unapplied() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_dir = dir.path().join("data");
        std::fs::create_dir(&snapshot_dir).unwrap();
        let path = snapshot_dir.join("todos.json");

        let store = MemoryStore::open(&path).await.unwrap();
        let todo = store.insert(new_todo("a", Priority::Normal)).await.unwrap();
        std::fs::remove_dir_all(&snapshot_dir).unwrap();

        let patch = TodoPatch {
            title: Some("renamed".to_string()),
            completed: Some(true),
            priority: Some(Priority::Extreme),
        };
        let err = store.find_by_id_and_update(todo.id, patch).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(store.find_by_id(todo.id).await.unwrap(), Some(todo.clone()));

        let err = store.find_by_id_and_delete(todo.id).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(store.find(None).await.unwrap(), vec![todo]);
    }

    #[tokio::test]
    async fn find_by_id_returns_stored_document() {
        let store = MemoryStore::new();
        let todo = store.insert(new_todo("a", Priority::Medium)).await.unwrap();
        assert_eq!(store.find_by_id(todo.id).await.unwrap(), Some(todo));
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "not json").unwrap();

        let err = MemoryStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Snapshot(_)));
    }
}
