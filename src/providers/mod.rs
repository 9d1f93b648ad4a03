pub mod caching;
pub mod open_exchange_rates;
