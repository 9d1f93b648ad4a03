//! Exchange rate abstractions

use super::money::Currency;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Units of each currency per 1 USD.
pub type RateTable = HashMap<Currency, f64>;

/// Loads rates pivoted on USD for a set of currencies.
///
/// Implementations must return an entry for every requested currency. The
/// list holds one or two distinct codes.
#[async_trait]
pub trait UsdRateLoader: Send + Sync {
    async fn load_usd_base_rates(&self, targets: &[Currency]) -> Result<RateTable>;
}

#[async_trait]
pub trait CurrencyListProvider: Send + Sync {
    async fn available_currencies(&self) -> Result<Vec<Currency>>;
}
