//! Todo operations over the store
//!
//! Request bodies arrive here already revived by the codec. Everything going
//! into or out of the store passes through the identifier bridge.

use std::sync::Arc;

use crate::codec::TaggedValue;
use crate::core::config::IdConfig;
use crate::core::error::{Error, Result, StorageError};
use crate::storage::bridge::{to_storage_id, todo_from_document, todo_to_document};
use crate::storage::{ReplaceMode, Store};
use crate::types::{Todo, TodoId};

use super::id_gen::IdGenerator;
use super::normalize::normalize;

/// CRUD operations on todos
pub struct TodoService {
    store: Arc<Store>,
    ids: IdGenerator,
    max_insert_attempts: u32,
}

impl TodoService {
    /// Service over `store`
    pub fn new(store: Arc<Store>, config: &IdConfig) -> Self {
        Self {
            ids: IdGenerator::new(store.clone()),
            store,
            max_insert_attempts: config.max_insert_attempts.max(1),
        }
    }

    /// All todos in id order
    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.store
            .find_all()
            .await?
            .into_iter()
            .map(todo_from_document)
            .collect()
    }

    /// Create a todo under a freshly generated id
    ///
    /// The free-id check and the insert are not atomic. When a concurrent
    /// creator takes the id in between, the insert fails on the duplicate
    /// key and a new id is drawn; after `max_insert_attempts` such failures
    /// the create reports [`Error::Conflict`].
    pub async fn create(&self, body: &TaggedValue) -> Result<Todo> {
        if body.get("_id").is_some() {
            return Err(Error::validation("_id must not be set on a new todo"));
        }
        let draft = normalize(body)?;

        for attempt in 1..=self.max_insert_attempts {
            let id = self.ids.generate_unused_id().await?;
            let todo = draft.clone().into_todo(id);

            match self.store.insert_one(todo_to_document(&todo)?).await {
                Ok(_) => {
                    tracing::info!("Created todo {}", todo.id);
                    return Ok(todo);
                }
                Err(StorageError::DuplicateKey(_)) => {
                    tracing::warn!(
                        "Id {} was taken before insert (attempt {}/{})",
                        todo.id,
                        attempt,
                        self.max_insert_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::conflict(format!(
            "could not insert under a free id after {} attempts",
            self.max_insert_attempts
        )))
    }

    /// Todo by id
    pub async fn get(&self, id: &TodoId) -> Result<Option<Todo>> {
        let storage_id = to_storage_id(id)?;
        match self.store.find_by_id(storage_id).await? {
            Some(document) => Ok(Some(todo_from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Replace an existing todo; `None` if there is nothing under `id`
    ///
    /// The body must repeat the id it is sent to.
    pub async fn update(&self, id: &TodoId, body: &TaggedValue) -> Result<Option<Todo>> {
        let draft = normalize(body)?;
        match &draft.id {
            None => return Err(Error::validation("_id is required")),
            Some(body_id) if body_id != id => {
                tracing::warn!("ID mismatch: path {} vs body {}", id, body_id);
                return Err(Error::validation("ID mismatch between URI and JSON"));
            }
            Some(_) => {}
        }

        let storage_id = to_storage_id(id)?;
        let todo = draft.into_todo(id.clone());
        let replaced = self
            .store
            .replace_by_id(storage_id, todo_to_document(&todo)?, ReplaceMode::Replace)
            .await?;

        if replaced {
            tracing::info!("Updated todo {}", id);
            Ok(Some(todo))
        } else {
            Ok(None)
        }
    }

    /// Delete a todo; false if there was nothing to delete
    pub async fn delete(&self, id: &TodoId) -> Result<bool> {
        let storage_id = to_storage_id(id)?;
        let deleted = self.store.delete_by_id(storage_id).await?;
        if deleted {
            tracing::info!("Deleted todo {}", id);
        }
        Ok(deleted)
    }

    /// Upsert fixed todos, keeping their ids
    pub async fn seed(&self, todos: &[Todo]) -> Result<()> {
        for todo in todos {
            let storage_id = to_storage_id(&todo.id)?;
            self.store
                .replace_by_id(storage_id, todo_to_document(todo)?, ReplaceMode::Upsert)
                .await?;
        }
        tracing::info!("Seeded {} todos", todos.len());
        Ok(())
    }
}

/// The sample todos shipped with the original deployment
pub fn demo_todos() -> Vec<Todo> {
    vec![
        Todo {
            id: TodoId::from(1671056616571),
            title: "Übung 4 machen".to_string(),
            description: String::new(),
            duetime: Some(1668211200000),
            is_done: false,
        },
        Todo {
            id: TodoId::from(1671087245763),
            title: "Für die Klausur Webentwicklung lernen".to_string(),
            description: String::new(),
            duetime: Some(1673654400000),
            is_done: true,
        },
        Todo {
            id: TodoId::from(1671087245764),
            title: "Einen Kuchen backen".to_string(),
            description: String::new(),
            duetime: Some(1673654400000),
            is_done: false,
        },
    ]
}
