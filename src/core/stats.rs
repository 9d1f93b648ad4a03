//! Usage statistics over completed conversions

use super::money::{Currency, Money};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completed conversion, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub source: Money,
    pub target: Money,
    pub recorded_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(source: Money, target: Money) -> Self {
        Self {
            source,
            target,
            recorded_at: Utc::now(),
        }
    }
}

/// Aggregate of all conversions between one ordered currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPairStats {
    pub source: Currency,
    pub target: Currency,
    pub count: u64,
    pub total_target_amount: f64,
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn record_conversion(&self, record: &ConversionRecord) -> Result<()>;

    /// Pair aggregates, most frequent first.
    async fn most_frequent_conversions(&self) -> Result<Vec<CurrencyPairStats>>;
}

/// Groups records by (source, target) currency and orders the groups by
/// count, then by total target amount, both descending.
pub fn aggregate_pair_stats<'a, I>(records: I) -> Vec<CurrencyPairStats>
where
    I: IntoIterator<Item = &'a ConversionRecord>,
{
    let mut groups: HashMap<(Currency, Currency), (u64, f64)> = HashMap::new();
    for record in records {
        let key = (
            record.source.currency.clone(),
            record.target.currency.clone(),
        );
        let entry = groups.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.target.value;
    }

    let mut stats: Vec<CurrencyPairStats> = groups
        .into_iter()
        .map(|((source, target), (count, total))| CurrencyPairStats {
            source,
            target,
            count,
            total_target_amount: total,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.total_target_amount.total_cmp(&a.total_target_amount))
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    stats
}
