use crate::core::stats::{ConversionRecord, CurrencyPairStats, StatsStore, aggregate_pair_stats};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Conversion records persisted in a fjall partition, keyed by
/// (timestamp nanos, sequence) so iteration follows recording order.
pub struct DiskStatsStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    sequence: AtomicU64,
}

impl DiskStatsStore {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
            sequence: AtomicU64::new(0),
        }
    }

    fn record_key(&self, record: &ConversionRecord) -> [u8; 16] {
        let nanos = record
            .recorded_at
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .max(0) as u64;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&nanos.to_be_bytes());
        key[8..].copy_from_slice(&seq.to_be_bytes());
        key
    }

    fn load_records(&self) -> Result<Vec<ConversionRecord>> {
        self.partition
            .iter()
            .map(|kv| {
                let (_, value) = kv?;
                serde_json::from_slice(&value).context("Corrupt conversion record")
            })
            .collect()
    }
}

#[async_trait]
impl StatsStore for DiskStatsStore {
    async fn record_conversion(&self, record: &ConversionRecord) -> Result<()> {
        debug!(source = %record.source, target = %record.target, "Inserting conversion");
        let key = self.record_key(record);
        let value = serde_json::to_vec(record)?;
        self.partition
            .insert(key.to_vec(), value)
            .context("Failed to insert conversion record")?;
        self.keyspace
            .persist(PersistMode::Buffer)
            .context("Failed to persist conversion record")?;
        info!(source = %record.source, target = %record.target, "Inserted conversion");
        Ok(())
    }

    async fn most_frequent_conversions(&self) -> Result<Vec<CurrencyPairStats>> {
        debug!("Aggregating most frequent conversions");
        let records = self.load_records()?;
        let stats = aggregate_pair_stats(&records);
        info!(
            records = records.len(),
            pairs = stats.len(),
            "Most frequent conversions loaded"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::money::Money;
    use crate::store::Store;
    use tempfile::tempdir;

    fn record(from: &str, value: f64, to: &str, converted: f64) -> ConversionRecord {
        ConversionRecord::new(
            Money::new(value, from.parse().unwrap()),
            Money::new(converted, to.parse().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_records_are_aggregated() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let stats = store.stats().unwrap();

        stats
            .record_conversion(&record("EUR", 10.0, "CZK", 250.0))
            .await
            .unwrap();
        stats
            .record_conversion(&record("EUR", 2.0, "CZK", 50.0))
            .await
            .unwrap();
        stats
            .record_conversion(&record("USD", 1.0, "EUR", 0.9))
            .await
            .unwrap();

        let pairs = stats.most_frequent_conversions().await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].source.as_str(), "EUR");
        assert_eq!(pairs[0].target.as_str(), "CZK");
        assert_eq!(pairs[0].count, 2);
        assert_eq!(pairs[0].total_target_amount, 300.0);
        assert_eq!(pairs[1].count, 1);
    }

    #[tokio::test]
    async fn test_records_with_same_timestamp_are_kept() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let stats = store.stats().unwrap();

        let same = record("USD", 1.0, "EUR", 0.9);
        stats.record_conversion(&same).await.unwrap();
        stats.record_conversion(&same).await.unwrap();

        let pairs = stats.most_frequent_conversions().await.unwrap();
        assert_eq!(pairs[0].count, 2);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            let stats = store.stats().unwrap();
            stats
                .record_conversion(&record("GBP", 1.0, "USD", 1.3))
                .await
                .unwrap();
            store.persist().unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let pairs = store
            .stats()
            .unwrap()
            .most_frequent_conversions()
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].source.as_str(), "GBP");
    }
}
