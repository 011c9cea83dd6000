//! Storage layer for the todo service
//!
//! The document store is reached through the [`DocumentBackend`] trait, which
//! speaks only in the store's native document and id types. Conversions
//! between those and application ids live in [`bridge`]; nothing else in the
//! crate touches an `ObjectId`.
//!
//! Backends:
//! - [`MemStore`]: in-process `DashMap`, always available
//! - `MongoStore`: MongoDB, behind the `mongodb` cargo feature

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;

use crate::core::error::StorageError;

/// Identifier bridge between application ids and storage ids
pub mod bridge;

/// Readiness-gated store handle and its factory
pub mod store;

/// In-memory backend
pub mod mem_store;

/// MongoDB backend
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use mem_store::MemStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;
pub use store::{connect_store, Store};

/// Result type for backend operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// How `replace_by_id` treats a missing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceMode {
    /// Only replace an existing document
    Replace,
    /// Insert when nothing matches
    Upsert,
}

/// Operations the service needs from a document store
///
/// Documents are addressed by their `_id` field. `insert_one` must refuse a
/// document whose `_id` is already taken with [`StorageError::DuplicateKey`].
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Every document, in ascending `_id` order
    async fn find_all(&self) -> StorageResult<Vec<Document>>;

    /// The document with this id, if any
    async fn find_by_id(&self, id: ObjectId) -> StorageResult<Option<Document>>;

    /// Insert a document carrying its `_id` and return that id
    async fn insert_one(&self, document: Document) -> StorageResult<ObjectId>;

    /// Replace the document with this id; true when something was written
    async fn replace_by_id(
        &self,
        id: ObjectId,
        document: Document,
        mode: ReplaceMode,
    ) -> StorageResult<bool>;

    /// Delete the document with this id; true when something was removed
    async fn delete_by_id(&self, id: ObjectId) -> StorageResult<bool>;

    /// Number of documents with this id (0 or 1)
    async fn count_by_id(&self, id: ObjectId) -> StorageResult<u64>;

    /// Check the backend is reachable
    async fn ping(&self) -> StorageResult<()>;
}
