use super::ui;
use crate::core::money::{Money, format_money};
use crate::core::stats::{CurrencyPairStats, StatsStore};
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn stats_table(pairs: &[CurrencyPairStats], decimals: usize) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Source"),
        ui::header_cell("Target"),
        ui::header_cell("Conversions"),
        ui::header_cell("Total converted"),
    ]);

    for (rank, pair) in pairs.iter().enumerate() {
        let total = Money::new(pair.total_target_amount, pair.target.clone());
        table.add_row(vec![
            ui::number_cell((rank + 1).to_string()),
            Cell::new(pair.source.as_str()),
            Cell::new(pair.target.as_str()),
            ui::number_cell(pair.count.to_string()),
            ui::number_cell(format_money(&total, decimals)),
        ]);
    }
    table
}

pub async fn run(stats: &dyn StatsStore, top: Option<usize>, max_decimals: u32) -> Result<()> {
    let mut pairs = stats.most_frequent_conversions().await?;
    if let Some(top) = top {
        pairs.truncate(top);
    }

    println!("{}\n", ui::style_text("Top pairs", ui::StyleType::Title));
    if pairs.is_empty() {
        println!(
            "{}",
            ui::style_text("No conversions recorded yet", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!("{}", stats_table(&pairs, max_decimals as usize));
    Ok(())
}
