//! Deterministic in-process [`KvStore`] backed by a `BTreeMap`.
//!
//! This is the store the daemon runs against and the fake the test suites
//! inject; both get identical semantics. Per-call atomicity comes from the
//! `RwLock` around the map, nothing more.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{KvStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryKvStore {
    map: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys. Test-suite convenience.
    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.map.read().await.get(key).cloned())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>, StoreError> {
        let map = self.map.read().await;
        Ok(keys.iter().map(|k| map.get(k).cloned()).collect())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.map.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.map.write().await.remove(key);
        Ok(())
    }
}
