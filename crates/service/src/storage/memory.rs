use std::{collections::BTreeMap, sync::Arc};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::storage::{KeyValueStore, ScanFilter};

/// In-memory table. Same semantics as `JsonMapStore`, nothing persisted.
pub struct MemoryStore<V> {
    inner: RwLock<BTreeMap<String, V>>,
}

impl<V: Clone + Send + Sync + 'static> MemoryStore<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(BTreeMap::new()) })
    }

    /// Build a table pre-populated with `entries`.
    pub fn with_entries<I>(entries: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        Arc::new(Self { inner: RwLock::new(entries.into_iter().collect()) })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> KeyValueStore<V> for MemoryStore<V> {
    async fn scan(&self, filter: ScanFilter<'_, V>) -> Result<Vec<(String, V)>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.iter().filter(|(_, v)| filter(*v)).map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<V>, ServiceError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn put(&self, key: String, value: V) -> Result<(), ServiceError> {
        self.inner.write().await.insert(key, value);
        Ok(())
    }

    async fn put_if_absent(&self, key: String, value: V) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, ServiceError> {
        Ok(self.inner.write().await.remove(key).is_some())
    }
}
