//! Uniqueness generator
//!
//! Ids are drawn uniformly from `[0, 2^53)` so that even clients that read
//! JSON numbers as doubles could hold them exactly, and redrawn until the
//! store reports the candidate as free.
//!
//! The check and the later insert are separate store calls, so two creators
//! can both see the same candidate as free. The store's unique `_id` index
//! catches that; see `TodoService::create` for the retry.

use std::future::Future;
use std::sync::Arc;

use rand::Rng;

use crate::core::error::{Error, Result};
use crate::storage::bridge::to_storage_id;
use crate::storage::Store;
use crate::types::TodoId;

/// Exclusive upper bound of generated ids (2^53)
pub const ID_CEILING: u64 = 1 << 53;

/// Uniform draw from `[0, ID_CEILING)`
pub fn random_id() -> u64 {
    rand::rng().random_range(0..ID_CEILING)
}

/// Draw candidates until `exists` reports one as unused
///
/// There is no retry cap; at 2^53 possible values a collection would need
/// to be enormous before the expected number of draws moves off 1.
pub async fn generate_unused_id<D, E, Fut>(mut draw: D, exists: E) -> Result<TodoId>
where
    D: FnMut() -> u64,
    E: Fn(TodoId) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut draws: u64 = 0;
    loop {
        let candidate = TodoId::from(draw());
        draws += 1;
        if !exists(candidate.clone()).await? {
            tracing::debug!("Drew unused id {} after {} draw(s)", candidate, draws);
            return Ok(candidate);
        }
        tracing::debug!("Id {} already in use, redrawing", candidate);
    }
}

/// Generator bound to the live store
pub struct IdGenerator {
    store: Arc<Store>,
}

impl IdGenerator {
    /// Generator checking candidates against `store`
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// A random id that is not in the store at the time of the check
    pub async fn generate_unused_id(&self) -> Result<TodoId> {
        let store = &self.store;
        generate_unused_id(random_id, move |id| async move {
            let storage_id = to_storage_id(&id)?;
            let count = store.count_by_id(storage_id).await?;
            Ok::<bool, Error>(count > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StorageError;
    use crate::storage::bridge::todo_to_document;
    use crate::storage::MemStore;
    use crate::types::TodoDraft;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_redraws_past_taken_ids() {
        let taken: HashSet<TodoId> = [5u64, 9, 100].into_iter().map(TodoId::from).collect();
        let mut script = vec![5u64, 9, 100, 42].into_iter();
        let mut calls = 0;

        let id = generate_unused_id(
            || {
                calls += 1;
                script.next().expect("script exhausted")
            },
            |id| {
                let hit = taken.contains(&id);
                async move { Ok(hit) }
            },
        )
        .await
        .unwrap();

        assert_eq!(id, TodoId::from(42));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_store_backed_generator_avoids_existing_ids() {
        let store = Arc::new(Store::with_backend(Arc::new(MemStore::new())));
        for n in [5u64, 9, 100] {
            let todo = TodoDraft::titled("seed").into_todo(TodoId::from(n));
            store.insert_one(todo_to_document(&todo).unwrap()).await.unwrap();
        }

        let generator = IdGenerator::new(store);
        for _ in 0..1000 {
            let id = generator.generate_unused_id().await.unwrap();
            assert!(![5u64, 9, 100].map(TodoId::from).contains(&id));
            assert!(id < TodoId::from(ID_CEILING));
        }
    }

    #[tokio::test]
    async fn test_closed_store_fails_instead_of_spinning() {
        let generator = IdGenerator::new(Arc::new(Store::new()));
        assert!(matches!(
            generator.generate_unused_id().await,
            Err(Error::Storage(StorageError::NotOpen))
        ));
    }

    #[test]
    fn test_random_id_stays_below_ceiling() {
        for _ in 0..10_000 {
            assert!(random_id() < ID_CEILING);
        }
    }
}
