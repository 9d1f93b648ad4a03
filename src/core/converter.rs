//! Currency conversion on top of a USD-only rate source.
//!
//! The upstream free tier only quotes rates against USD and limits the
//! number of requests, so every conversion issues at most one rate request:
//! none for identity conversions, one currency when either side is USD, and
//! both currencies in a single request otherwise.

use super::money::{Currency, Money};
use super::rates::{RateTable, UsdRateLoader};
use anyhow::{Result, anyhow};
use std::slice;
use tracing::debug;

/// Converts `source` into `target` units.
///
/// Loader failures are returned as-is.
pub async fn convert<L>(loader: &L, source: &Money, target: &Currency) -> Result<f64>
where
    L: UsdRateLoader + ?Sized,
{
    if source.currency == *target || source.value == 0.0 {
        return Ok(source.value);
    }

    if source.currency.is_usd() {
        let rates = loader.load_usd_base_rates(slice::from_ref(target)).await?;
        return Ok(source.value * rate_of(&rates, target)?);
    }

    if target.is_usd() {
        let rates = loader
            .load_usd_base_rates(slice::from_ref(&source.currency))
            .await?;
        return Ok(source.value / rate_of(&rates, &source.currency)?);
    }

    let rates = loader
        .load_usd_base_rates(&[source.currency.clone(), target.clone()])
        .await?;
    let usd_amount = source.value / rate_of(&rates, &source.currency)?;
    debug!(usd_amount, "Converted through USD");
    Ok(usd_amount * rate_of(&rates, target)?)
}

fn rate_of(rates: &RateTable, currency: &Currency) -> Result<f64> {
    rates
        .get(currency)
        .copied()
        .ok_or_else(|| anyhow!("No rate returned for currency {}", currency))
}
