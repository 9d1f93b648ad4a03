//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod conversion;
pub mod converter;
pub mod log;
pub mod money;
pub mod rates;
pub mod stats;

// Re-export main types for cleaner imports
pub use money::{Currency, Money, ValidationError};
pub use rates::{CurrencyListProvider, RateTable, UsdRateLoader};
pub use stats::{ConversionRecord, CurrencyPairStats, StatsStore};
