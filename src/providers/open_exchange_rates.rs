use crate::core::money::{Currency, USD};
use crate::core::rates::{CurrencyListProvider, RateTable, UsdRateLoader};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Client for the Open Exchange Rates API. The free plan only serves rates
/// against USD.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: Option<String>,
    client: reqwest::Client,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cconverter/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(OpenExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            client,
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request error for URL: {url}"))?;
        debug!(status = %response.status(), "Received Open Exchange response");

        if response.status() != reqwest::StatusCode::OK {
            return Err(anyhow!(
                "Open Exchange server responded with an HTTP error {}",
                response.status().as_u16()
            ));
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl UsdRateLoader for OpenExchangeRatesProvider {
    #[instrument(name = "OpenExchangeRates", skip(self))]
    async fn load_usd_base_rates(&self, targets: &[Currency]) -> Result<RateTable> {
        let app_id = self
            .app_id
            .as_deref()
            .context("Missing Open Exchange Rates app id")?;
        let symbols = targets
            .iter()
            .map(Currency::as_str)
            .collect::<Vec<_>>()
            .join(",");

        debug!("Requesting rates for {}", symbols);
        let url = format!("{}/api/latest.json", self.base_url);
        let response = self
            .get(
                &url,
                &[("app_id", app_id), ("base", USD), ("symbols", symbols.as_str())],
            )
            .await?;

        let body = response
            .json::<LatestRatesResponse>()
            .await
            .with_context(|| format!("Failed to parse rates response for {symbols}"))?;

        Ok(body
            .rates
            .into_iter()
            .filter_map(|(code, rate)| code.parse::<Currency>().ok().map(|c| (c, rate)))
            .collect())
    }
}

#[async_trait]
impl CurrencyListProvider for OpenExchangeRatesProvider {
    #[instrument(name = "OpenExchangeCurrencies", skip(self))]
    async fn available_currencies(&self) -> Result<Vec<Currency>> {
        debug!("Requesting currencies");
        let url = format!("{}/api/currencies.json", self.base_url);
        let response = self.get(&url, &[]).await?;

        let labels = response
            .json::<HashMap<String, String>>()
            .await
            .context("Failed to parse currencies response")?;

        let mut currencies: Vec<Currency> = labels
            .into_keys()
            .filter_map(|code| match code.parse() {
                Ok(currency) => Some(currency),
                Err(_) => {
                    debug!("Skipping unsupported currency code {}", code);
                    None
                }
            })
            .collect();
        currencies.sort();
        Ok(currencies)
    }
}
