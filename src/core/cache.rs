use async_trait::async_trait;
use std::hash::Hash;
use std::time::Duration;

/// Key-value cache with optional per-entry expiry.
///
/// Expired entries behave as misses. Storage failures are not surfaced:
/// a cache that cannot answer reports a miss.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
