pub mod disk;
pub mod memory;
pub mod stats;

use anyhow::{Context, Result};
use disk::DiskCache;
use fjall::{Keyspace, PartitionCreateOptions, PersistMode};
use serde::{Serialize, de::DeserializeOwned};
use stats::DiskStatsStore;
use std::path::Path;
use tracing::debug;

const CONVERSIONS_PARTITION: &str = "conversions";

/// Persistent storage backed by a single fjall keyspace. Each cache and the
/// conversion log live in their own partition.
pub struct Store {
    keyspace: Keyspace,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening store at {}", path.display());
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        Ok(Self { keyspace })
    }

    pub fn cache<K, V>(&self, name: &str) -> Result<DiskCache<K, V>>
    where
        K: Serialize,
        V: Serialize + DeserializeOwned,
    {
        let partition = self
            .keyspace
            .open_partition(&format!("cache_{name}"), PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache partition {name}"))?;
        Ok(DiskCache::new(partition))
    }

    pub fn stats(&self) -> Result<DiskStatsStore> {
        let partition = self
            .keyspace
            .open_partition(CONVERSIONS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open conversions partition")?;
        Ok(DiskStatsStore::new(self.keyspace.clone(), partition))
    }

    /// Flushes pending writes to disk.
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist store")
    }
}
