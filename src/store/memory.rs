/*!
 * In-Memory Backing Store
 * Volatile store for tests and sessions without durable storage
 */

use ahash::RandomState;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use super::traits::{KvStore, StoreResult};

/// In-memory key-value store
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<String, Value, RandomState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        self.records.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.records.remove(key);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.records.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
