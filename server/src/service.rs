//! The four todo operations, validated and run against a store handle.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::TodoError;
use crate::model::{CreateTodo, Priority, Todo, UpdateTodo};
use crate::store::{MemoryStore, TodoStore};

/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// A service over a fresh `MemoryStore` with no snapshot file.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Validate and persist a new todo. Nothing is written if validation fails.
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let new = input.validate()?;
        let todo = self.store.insert(new).await?;
        info!(id = %todo.id, priority = %todo.priority, "created todo");
        Ok(todo)
    }

    /// All todos, optionally only those with `priority`, newest first.
    pub async fn list(&self, priority: Option<Priority>) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.find(priority).await?;
        debug!(count = todos.len(), ?priority, "listed todos");
        Ok(todos)
    }

    /// `NotFound` unless a todo with `id` is stored.
    pub async fn ensure_exists(&self, id: Uuid) -> Result<(), TodoError> {
        match self.store.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(TodoError::NotFound(id.to_string())),
        }
    }

    /// Merge the fields present in `input` onto the todo with `id`. A missing
    /// todo is `NotFound` even when `input` is invalid.
    pub async fn update(&self, id: Uuid, input: UpdateTodo) -> Result<Todo, TodoError> {
        let patch = match input.validate() {
            Ok(patch) => patch,
            Err(e) => {
                self.ensure_exists(id).await?;
                return Err(e);
            }
        };
        let todo = self
            .store
            .find_by_id_and_update(id, patch)
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        info!(%id, completed = todo.completed, "updated todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TodoError> {
        self.store
            .find_by_id_and_delete(id)
            .await?
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        info!(%id, "deleted todo");
        Ok(())
    }
}
