//! In-memory document backend using DashMap
//!
//! Documents are kept as BSON documents keyed by their `_id`, so the service
//! exercises the same id conversions it needs against a real document store.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{DocumentBackend, ReplaceMode, StorageResult};
use crate::core::error::StorageError;

/// In-memory document backend
#[derive(Debug, Default)]
pub struct MemStore {
    /// Map of storage id to document, `_id` included
    documents: DashMap<ObjectId, Document>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }
}

#[async_trait]
impl DocumentBackend for MemStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self) -> StorageResult<Vec<Document>> {
        let mut entries: Vec<(ObjectId, Document)> = self
            .documents
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(id, _)| id.bytes());
        Ok(entries.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> StorageResult<Option<Document>> {
        Ok(self.documents.get(&id).map(|doc| doc.value().clone()))
    }

    async fn insert_one(&self, document: Document) -> StorageResult<ObjectId> {
        let id = document
            .get_object_id("_id")
            .map_err(|e| StorageError::Backend(format!("document has no usable _id: {}", e)))?;

        // The entry holds its shard locked; no other map access until it drops
        match self.documents.entry(id) {
            Entry::Occupied(_) => {
                tracing::debug!("MemStore: duplicate _id {}", id.to_hex());
                Err(StorageError::DuplicateKey(id.to_hex()))
            }
            Entry::Vacant(slot) => {
                slot.insert(document);
                tracing::debug!("MemStore: inserted {}", id.to_hex());
                Ok(id)
            }
        }
    }

    async fn replace_by_id(
        &self,
        id: ObjectId,
        mut document: Document,
        mode: ReplaceMode,
    ) -> StorageResult<bool> {
        document.insert("_id", id);
        match mode {
            ReplaceMode::Replace => match self.documents.get_mut(&id) {
                Some(mut existing) => {
                    *existing = document;
                    Ok(true)
                }
                None => Ok(false),
            },
            ReplaceMode::Upsert => {
                self.documents.insert(id, document);
                Ok(true)
            }
        }
    }

    async fn delete_by_id(&self, id: ObjectId) -> StorageResult<bool> {
        Ok(self.documents.remove(&id).is_some())
    }

    async fn count_by_id(&self, id: ObjectId) -> StorageResult<u64> {
        Ok(u64::from(self.documents.contains_key(&id)))
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
