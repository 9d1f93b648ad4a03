use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a fjall partition. Keys and entries are JSON encoded.
pub struct DiskCache<K, V> {
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn new(partition: PartitionHandle) -> Self {
        Self {
            partition,
            _marker: PhantomData,
        }
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(raw) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&raw)?;
        if entry.expires_at.is_some_and(|at| SystemTime::now() >= at) {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + Debug + 'static,
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.read(key).unwrap_or_else(|e| {
            debug!("DiskCache get error: {}", e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let res: Result<()> = (|| {
            let expires_at = ttl.map(|d| SystemTime::now() + d);
            let entry = CacheEntry { value, expires_at };
            self.partition
                .insert(serde_json::to_vec(&key)?, serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for key: {:?}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCache put error: {}", e);
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = (|| Ok(self.partition.remove(serde_json::to_vec(key)?)?))();
        if let Err(e) = res {
            debug!("DiskCache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        let res: Result<()> = (|| {
            for kv in self.partition.keys() {
                self.partition.remove(kv?)?;
            }
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCache clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::tempdir;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let cache = store.cache::<String, Vec<String>>("test").unwrap();

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache
            .put("key1".to_string(), vec!["EUR".to_string()], None)
            .await;
        assert_eq!(
            cache.get(&"key1".to_string()).await,
            Some(vec!["EUR".to_string()])
        );
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let cache = store.cache::<String, i32>("test").unwrap();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove_and_clear() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let cache = store.cache::<String, i32>("test").unwrap();

        cache.put("key1".to_string(), 123, None).await;
        cache.put("key2".to_string(), 456, None).await;

        cache.remove(&"key1".to_string()).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.clear().await;
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            let cache = store.cache::<String, i32>("test").unwrap();
            cache.put("key1".to_string(), 7, None).await;
            store.persist().unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let cache = store.cache::<String, i32>("test").unwrap();
        assert_eq!(cache.get(&"key1".to_string()).await, Some(7));
    }
}
