//! MongoDB document backend
//!
//! Todos live in one collection. MongoDB's mandatory unique index on `_id`
//! turns a concurrent insert of an already-taken id into a duplicate-key
//! write error (code 11000), which maps onto [`StorageError::DuplicateKey`].

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Collection, Database};

use super::{DocumentBackend, ReplaceMode, StorageResult};
use crate::core::error::StorageError;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed document store
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect to `uri` and use `collection` in `database`
    pub async fn connect(uri: &str, database: &str, collection: &str) -> StorageResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let database = client.database(database);
        let collection = database.collection::<Document>(collection);
        tracing::info!(
            "MongoDB client ready for {}.{}",
            database.name(),
            collection.name()
        );
        Ok(Self {
            database,
            collection,
        })
    }
}

fn backend_error(err: mongodb::error::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl DocumentBackend for MongoStore {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn find_all(&self) -> StorageResult<Vec<Document>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(backend_error)?;
        cursor.try_collect().await.map_err(backend_error)
    }

    async fn find_by_id(&self, id: ObjectId) -> StorageResult<Option<Document>> {
        self.collection
            .find_one(doc! {"_id": id})
            .await
            .map_err(backend_error)
    }

    async fn insert_one(&self, document: Document) -> StorageResult<ObjectId> {
        let result = self.collection.insert_one(document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::DuplicateKey(e.to_string())
            } else {
                backend_error(e)
            }
        })?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(StorageError::Corruption(format!(
                "inserted _id is {:?}, not an ObjectId",
                other.element_type()
            ))),
        }
    }

    async fn replace_by_id(
        &self,
        id: ObjectId,
        mut document: Document,
        mode: ReplaceMode,
    ) -> StorageResult<bool> {
        document.insert("_id", id);
        let result = self
            .collection
            .replace_one(doc! {"_id": id}, document)
            .upsert(mode == ReplaceMode::Upsert)
            .await
            .map_err(backend_error)?;
        Ok(result.matched_count > 0 || result.upserted_id.is_some())
    }

    async fn delete_by_id(&self, id: ObjectId) -> StorageResult<bool> {
        let result = self
            .collection
            .delete_one(doc! {"_id": id})
            .await
            .map_err(backend_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn count_by_id(&self, id: ObjectId) -> StorageResult<u64> {
        self.collection
            .count_documents(doc! {"_id": id})
            .await
            .map_err(backend_error)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|e| StorageError::Connection(format!("ping failed: {}", e)))?;
        Ok(())
    }
}
