use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::{KeyValueStore, ScanFilter};

/// JSON file-backed table.
///
/// Keeps the whole table in a `BTreeMap<String, V>` and rewrites the file on
/// every mutation. The write lock is held while the file is rewritten so
/// concurrent writers never interleave on disk.
#[derive(Clone)]
pub struct JsonMapStore<V> {
    inner: Arc<RwLock<BTreeMap<String, V>>>,
    file_path: PathBuf,
}

impl<V> JsonMapStore<V>
where
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    /// A file that exists but does not parse is an error rather than an empty table.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(ServiceError::store)?;
        }

        let map: BTreeMap<String, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Store(format!("malformed table file {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: BTreeMap<String, V> = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::store)?)
                    .await
                    .map_err(ServiceError::store)?;
                empty
            }
            Err(e) => return Err(ServiceError::store(e)),
        };
        debug!(path = %file_path.display(), records = map.len(), "table loaded");

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self, map: &BTreeMap<String, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(ServiceError::store)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::store)?;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for JsonMapStore<V>
where
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn scan(&self, filter: ScanFilter<'_, V>) -> Result<Vec<(String, V)>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.iter().filter(|(_, v)| filter(*v)).map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<V>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: String, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.save(&map).await
    }

    async fn put_if_absent(&self, key: String, value: V) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, value);
        self.save(&map).await?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonMapStore::<String>::new(&tmp).await?;

        // initially empty
        assert!(store.is_empty().await);

        store.put("b".into(), "2".into()).await?;
        store.put("a".into(), "1".into()).await?;
        assert_eq!(store.get("a").await?.as_deref(), Some("1"));

        // scan is key ordered
        let all = store.scan(&|_| true).await?;
        assert_eq!(all.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        let ones = store.scan(&|v: &String| v == "1").await?;
        assert_eq!(ones.len(), 1);

        // conditional write
        assert!(!store.put_if_absent("a".into(), "x".into()).await?);
        assert!(store.put_if_absent("c".into(), "3".into()).await?);
        assert_eq!(store.get("a").await?.as_deref(), Some("1"));

        // remove and reload persistence
        assert!(store.delete("b").await?);
        assert!(!store.delete("b").await?);
        let reloaded = JsonMapStore::<String>::new(&tmp).await?;
        assert_eq!(reloaded.len().await, 2);
        assert_eq!(reloaded.get("c").await?.as_deref(), Some("3"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        tokio::fs::write(&tmp, b"{not json").await?;
        let res = JsonMapStore::<String>::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Store(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
