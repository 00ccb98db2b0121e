use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::consumption::ConsumptionRecord,
    quantity::{KilowattHours, Pounds},
};

/// Exported file summary: one row per fuel.
pub fn build_summary_table<'a>(
    files: impl IntoIterator<Item = (&'a str, &'a [ConsumptionRecord])>,
) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["File", "Rows", "First", "Last", "Days", "Energy", "Cost", "Estimated"]);
    for (filename, records) in files {
        let energy: KilowattHours = records.iter().filter_map(|record| record.energy).sum();
        let cost: Pounds = records.iter().filter_map(|record| record.cost).sum();
        let n_days: u32 = records.iter().filter_map(|record| record.days_with_data).sum();
        let n_estimated = records
            .iter()
            .filter(|record| record.estimated.energy || record.estimated.cost)
            .count();
        let first = records.first().map_or("-", |record| record.from.as_str());
        let last = records.last().map_or("-", |record| record.from.as_str());
        table.add_row(vec![
            Cell::new(filename),
            Cell::new(records.len())
                .set_alignment(CellAlignment::Right)
                .fg(if records.is_empty() { Color::Red } else { Color::Green }),
            Cell::new(first).add_attribute(Attribute::Dim),
            Cell::new(last),
            Cell::new(n_days).set_alignment(CellAlignment::Right),
            Cell::new(energy).set_alignment(CellAlignment::Right),
            Cell::new(cost).set_alignment(CellAlignment::Right),
            Cell::new(n_estimated)
                .set_alignment(CellAlignment::Right)
                .fg(if n_estimated == 0 { Color::Green } else { Color::DarkYellow }),
        ]);
    }
    table
}
