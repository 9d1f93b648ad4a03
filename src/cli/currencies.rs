use super::ui;
use crate::core::money::Currency;
use crate::core::rates::CurrencyListProvider;
use anyhow::Result;
use comfy_table::{Cell, Table};

const CODES_PER_ROW: usize = 10;

pub fn currencies_table(currencies: &[Currency]) -> Table {
    let mut table = ui::new_styled_table();
    for row in currencies.chunks(CODES_PER_ROW) {
        table.add_row(row.iter().map(|c| Cell::new(c.as_str())));
    }
    table
}

pub async fn run(provider: &dyn CurrencyListProvider) -> Result<()> {
    let spinner = ui::new_spinner("Fetching available currencies...");
    let result = provider.available_currencies().await;
    spinner.finish_and_clear();
    let currencies = result?;

    println!(
        "{}\n",
        ui::style_text("Available currencies", ui::StyleType::Title)
    );
    println!("{}", currencies_table(&currencies));
    println!(
        "\n{}",
        ui::style_text(
            &format!("{} currencies", currencies.len()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currencies_table_wraps_rows() {
        let codes: Vec<Currency> = [
            "AED", "AUD", "CAD", "CHF", "CZK", "EUR", "GBP", "HUF", "JPY", "NOK", "PLN", "USD",
        ]
        .iter()
        .map(|c| c.parse().unwrap())
        .collect();

        let table = currencies_table(&codes);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("AED"));
        assert!(rendered.contains("USD"));
    }
}
