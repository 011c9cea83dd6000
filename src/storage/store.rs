//! Store handle with a readiness gate
//!
//! The handle is shared by every request. It starts closed; a backend is
//! installed once its connection is up. Operations on a closed handle fail
//! right away with [`StorageError::NotOpen`] instead of waiting, and callers
//! that do want to wait use [`Store::ready`].

use std::sync::Arc;

use bson::oid::ObjectId;
use bson::Document;
use parking_lot::RwLock;
use tokio::sync::watch;

use super::{DocumentBackend, MemStore, ReplaceMode, StorageResult};
use crate::core::config::{StorageConfig, StorageType};
use crate::core::error::{Error, Result, StorageError};

/// Shared handle to the document store
pub struct Store {
    backend: RwLock<Option<Arc<dyn DocumentBackend>>>,
    ready: watch::Sender<bool>,
}

impl Store {
    /// Create a closed store
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            backend: RwLock::new(None),
            ready,
        }
    }

    /// Create a store that is already open on `backend`
    pub fn with_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        let store = Self::new();
        store.open(backend);
        store
    }

    /// Install a backend and release everyone waiting on [`Store::ready`]
    pub fn open(&self, backend: Arc<dyn DocumentBackend>) {
        tracing::info!("Store open on {} backend", backend.name());
        *self.backend.write() = Some(backend);
        self.ready.send_replace(true);
    }

    /// Drop the backend; later operations fail with `NotOpen`
    pub fn close(&self) {
        if self.backend.write().take().is_some() {
            tracing::warn!("Store closed");
        }
        self.ready.send_replace(false);
    }

    /// Whether operations can currently be issued
    pub fn is_open(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until the store is open
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot see a closed channel
        let _ = rx.wait_for(|open| *open).await;
    }

    fn backend(&self) -> StorageResult<Arc<dyn DocumentBackend>> {
        self.backend.read().clone().ok_or(StorageError::NotOpen)
    }

    /// Every document in `_id` order
    pub async fn find_all(&self) -> StorageResult<Vec<Document>> {
        self.backend()?.find_all().await
    }

    /// Document by storage id
    pub async fn find_by_id(&self, id: ObjectId) -> StorageResult<Option<Document>> {
        self.backend()?.find_by_id(id).await
    }

    /// Insert a document, refusing a taken `_id`
    pub async fn insert_one(&self, document: Document) -> StorageResult<ObjectId> {
        self.backend()?.insert_one(document).await
    }

    /// Replace (or upsert) the document with this id
    pub async fn replace_by_id(
        &self,
        id: ObjectId,
        document: Document,
        mode: ReplaceMode,
    ) -> StorageResult<bool> {
        self.backend()?.replace_by_id(id, document, mode).await
    }

    /// Delete the document with this id
    pub async fn delete_by_id(&self, id: ObjectId) -> StorageResult<bool> {
        self.backend()?.delete_by_id(id).await
    }

    /// Count documents with this id
    pub async fn count_by_id(&self, id: ObjectId) -> StorageResult<u64> {
        self.backend()?.count_by_id(id).await
    }

    /// Ping the backend
    pub async fn ping(&self) -> StorageResult<()> {
        self.backend()?.ping().await
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Connect the configured backend and open `store` on it
pub async fn connect_store(store: &Store, config: &StorageConfig) -> Result<()> {
    tracing::info!("Connecting storage backend: {:?}", config.storage_type);

    let backend: Arc<dyn DocumentBackend> = match config.storage_type {
        StorageType::Memory => Arc::new(MemStore::new()),
        StorageType::Mongo => connect_mongo(config).await?,
    };

    backend.ping().await?;
    store.open(backend);
    Ok(())
}

#[cfg(feature = "mongodb")]
async fn connect_mongo(config: &StorageConfig) -> Result<Arc<dyn DocumentBackend>> {
    let backend =
        super::MongoStore::connect(&config.mongo_uri, &config.database, &config.collection).await?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongo(_config: &StorageConfig) -> Result<Arc<dyn DocumentBackend>> {
    Err(Error::config(
        "storage type 'mongo' needs a build with the `mongodb` feature",
    ))
}
