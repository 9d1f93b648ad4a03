pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use core::config;

use crate::core::cache::Cache;
use crate::core::conversion::{ConversionRequest, ConversionService};
use crate::core::money::Currency;
use crate::core::stats::StatsStore;
use crate::providers::caching::CachingCurrencyListProvider;
use crate::providers::open_exchange_rates::OpenExchangeRatesProvider;
use crate::store::Store;
use crate::store::memory::{MemoryCache, MemoryStatsStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

const CURRENCIES_CACHE: &str = "currencies";

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Convert {
        amount: String,
        source: String,
        target: String,
    },
    Currencies,
    Stats {
        top: Option<usize>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    let oxr = &config.providers.open_exchange_rates;
    debug!(
        base_url = %oxr.base_url,
        max_decimals = config.conversion.max_decimals,
        "Loaded config"
    );

    let store = open_store(&config);
    let rates_provider = OpenExchangeRatesProvider::new(&oxr.base_url, config.app_id())?;
    let max_decimals = config.conversion.max_decimals;

    let result = match command {
        AppCommand::Convert {
            amount,
            source,
            target,
        } => {
            let request = ConversionRequest::parse(&source, &target, &amount)?;
            let service = ConversionService::new(
                Arc::new(rates_provider),
                stats_store(store.as_ref()),
                max_decimals,
            );
            cli::convert::run(&service, request, max_decimals).await
        }
        AppCommand::Currencies => {
            let provider = CachingCurrencyListProvider::new(
                rates_provider,
                currency_cache(store.as_ref()),
                config.available_currencies_cache.ttl(),
            );
            cli::currencies::run(&provider).await
        }
        AppCommand::Stats { top } => {
            cli::stats::run(stats_store(store.as_ref()).as_ref(), top, max_decimals).await
        }
    };

    if let Some(store) = &store
        && let Err(e) = store.persist()
    {
        warn!(error = %e, "Failed to flush store");
    }
    result
}

/// Opens the on-disk store. Without one the app still works, but stats and
/// caches only last for this run.
fn open_store(config: &config::AppConfig) -> Option<Store> {
    match config
        .default_data_path()
        .and_then(|path| Store::open(&path))
    {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "Falling back to in-memory storage");
            None
        }
    }
}

fn stats_store(store: Option<&Store>) -> Arc<dyn StatsStore> {
    match store.map(Store::stats) {
        Some(Ok(stats)) => Arc::new(stats),
        Some(Err(e)) => {
            warn!(error = %e, "Falling back to in-memory stats");
            Arc::new(MemoryStatsStore::new())
        }
        None => Arc::new(MemoryStatsStore::new()),
    }
}

fn currency_cache(store: Option<&Store>) -> Arc<dyn Cache<String, Vec<Currency>>> {
    match store.map(|s| s.cache::<String, Vec<Currency>>(CURRENCIES_CACHE)) {
        Some(Ok(cache)) => Arc::new(cache),
        Some(Err(e)) => {
            warn!(error = %e, "Falling back to in-memory currency cache");
            Arc::new(MemoryCache::<String, Vec<Currency>>::new())
        }
        None => Arc::new(MemoryCache::<String, Vec<Currency>>::new()),
    }
}
