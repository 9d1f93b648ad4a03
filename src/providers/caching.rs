use crate::core::cache::Cache;
use crate::core::money::Currency;
use crate::core::rates::CurrencyListProvider;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const AVAILABLE_CURRENCIES_KEY: &str = "availableCurrencies";

/// Serves the available currency list from a cache, falling back to the
/// inner provider on a miss. Failures are not cached.
pub struct CachingCurrencyListProvider<T: CurrencyListProvider> {
    inner: T,
    cache: Arc<dyn Cache<String, Vec<Currency>>>,
    ttl: Option<Duration>,
}

impl<T: CurrencyListProvider> CachingCurrencyListProvider<T> {
    pub fn new(
        inner: T,
        cache: Arc<dyn Cache<String, Vec<Currency>>>,
        ttl: Option<Duration>,
    ) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<T: CurrencyListProvider> CurrencyListProvider for CachingCurrencyListProvider<T> {
    async fn available_currencies(&self) -> Result<Vec<Currency>> {
        let key = AVAILABLE_CURRENCIES_KEY.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Currencies loaded from cache");
            return Ok(cached);
        }

        let currencies = self.inner.available_currencies().await?;
        self.cache.put(key, currencies.clone(), self.ttl).await;
        Ok(currencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCache;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockInnerProvider {
        call_count: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl<'a> CurrencyListProvider for &'a MockInnerProvider {
        async fn available_currencies(&self) -> Result<Vec<Currency>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("upstream down"));
            }
            Ok(vec!["EUR".parse()?, "USD".parse()?])
        }
    }

    fn memory_cache() -> Arc<dyn Cache<String, Vec<Currency>>> {
        Arc::new(MemoryCache::<String, Vec<Currency>>::new())
    }

    #[tokio::test]
    async fn test_caching_currency_list_provider() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider =
            CachingCurrencyListProvider::new(&inner_provider, memory_cache(), None);

        // First call hits the inner provider
        let first = caching_provider.available_currencies().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);

        // Second call is cached
        let second = caching_provider.available_currencies().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_list_is_reloaded() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider = CachingCurrencyListProvider::new(
            &inner_provider,
            memory_cache(),
            Some(Duration::from_millis(10)),
        );

        caching_provider.available_currencies().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        caching_provider.available_currencies().await.unwrap();
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider =
            CachingCurrencyListProvider::new(&inner_provider, memory_cache(), None);

        inner_provider.fail.store(true, Ordering::SeqCst);
        assert!(caching_provider.available_currencies().await.is_err());

        inner_provider.fail.store(false, Ordering::SeqCst);
        assert!(caching_provider.available_currencies().await.is_ok());
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }
}
