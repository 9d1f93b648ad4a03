use super::ui;
use crate::core::conversion::{ConversionRequest, ConversionService};
use crate::core::money::{Money, format_money};
use anyhow::Result;
use tracing::warn;

/// Renders a finished conversion, e.g. `10.00 EUR = 250.00 CZK`.
pub fn conversion_line(source: &Money, converted: &Money, decimals: usize) -> String {
    format!(
        "{} = {}",
        format_money(source, decimals),
        ui::style_text(&format_money(converted, decimals), ui::StyleType::Result)
    )
}

pub async fn run(
    service: &ConversionService,
    request: ConversionRequest,
    max_decimals: u32,
) -> Result<()> {
    let decimals = max_decimals as usize;

    let spinner = ui::new_spinner("Fetching exchange rates...");
    let result = service.convert(request).await;
    spinner.finish_and_clear();
    let outcome = result?;

    println!(
        "{}",
        conversion_line(&outcome.source, &outcome.converted, decimals)
    );

    // Recording is best effort, but the process must not exit before it ran.
    if let Err(e) = outcome.recording.await {
        warn!(error = %e, "Conversion recording task failed");
    }
    Ok(())
}
