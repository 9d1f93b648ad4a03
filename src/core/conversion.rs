//! Validated conversion requests and the service that answers them.

use super::config::MAX_DECIMALS;
use super::converter;
use super::money::{Currency, Money, ValidationError};
use super::rates::UsdRateLoader;
use super::stats::{ConversionRecord, StatsStore};
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: Money,
    pub target: Currency,
}

impl ConversionRequest {
    /// Validates raw user input: both currencies must be 3-letter codes
    /// (case-insensitive) and the amount a finite number.
    pub fn parse(source: &str, target: &str, amount: &str) -> Result<Self, ValidationError> {
        let source_currency = parse_currency("source", source)?;
        let target = parse_currency("target", target)?;
        let value = amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))?;

        Ok(Self {
            source: Money::new(value, source_currency),
            target,
        })
    }
}

fn parse_currency(field: &'static str, value: &str) -> Result<Currency, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::InvalidCurrency {
            field,
            value: value.to_string(),
        })
}

/// Result of a conversion. `recording` completes once the conversion has
/// been written to the stats store (or failed to be).
#[derive(Debug)]
pub struct ConversionOutcome {
    pub source: Money,
    pub converted: Money,
    pub recording: JoinHandle<()>,
}

pub struct ConversionService {
    loader: Arc<dyn UsdRateLoader>,
    stats: Arc<dyn StatsStore>,
    minor_unit_factor: f64,
}

impl ConversionService {
    /// Amounts are converted as integer multiples of `10^-max_decimals`.
    /// `max_decimals` is capped at [`MAX_DECIMALS`].
    pub fn new(
        loader: Arc<dyn UsdRateLoader>,
        stats: Arc<dyn StatsStore>,
        max_decimals: u32,
    ) -> Self {
        let exponent = max_decimals.min(MAX_DECIMALS) as i32;
        Self {
            loader,
            stats,
            minor_unit_factor: 10f64.powi(exponent),
        }
    }

    #[instrument(
        name = "Conversion",
        skip(self, request),
        fields(source = %request.source.currency, target = %request.target)
    )]
    pub async fn convert(&self, request: ConversionRequest) -> Result<ConversionOutcome> {
        let factor = self.minor_unit_factor;
        let minor_units = Money::new(
            (request.source.value * factor).round(),
            request.source.currency,
        );
        debug!(amount = minor_units.value, "Converting in minor units");

        let converted_minor =
            converter::convert(self.loader.as_ref(), &minor_units, &request.target).await?;

        let source = Money::new(minor_units.value / factor, minor_units.currency);
        let converted = Money::new(converted_minor.round() / factor, request.target);
        info!(%source, %converted, "Conversion completed");

        let recording = self.record_in_background(ConversionRecord::new(
            source.clone(),
            converted.clone(),
        ));

        Ok(ConversionOutcome {
            source,
            converted,
            recording,
        })
    }

    fn record_in_background(&self, record: ConversionRecord) -> JoinHandle<()> {
        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            match stats.record_conversion(&record).await {
                Ok(()) => debug!("Recorded conversion"),
                Err(e) => warn!(error = %e, "Failed to record conversion"),
            }
        })
    }
}
