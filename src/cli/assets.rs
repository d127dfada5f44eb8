use super::ui;
use crate::core::asset::{Catalog, SourceBinding};
use crate::core::series::TimeSeriesStore;
use anyhow::Result;
use comfy_table::{Cell, Table};

fn source_label(binding: &SourceBinding) -> String {
    match binding {
        SourceBinding::AlphaVantageDaily {
            symbol,
            multiplier,
            offset,
        } => format!("Alpha Vantage {symbol} (x{multiplier} +{offset})"),
        SourceBinding::SpotPrice { symbol } => format!("gold-api {symbol}"),
        SourceBinding::ExchangeRate { base, quote } => format!("ExchangeRate-API {base}/{quote}"),
        SourceBinding::FlatList => "Import only".to_string(),
    }
}

pub(crate) fn catalog_table(catalog: &Catalog, store: &dyn TimeSeriesStore) -> Result<Table> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Category"),
        ui::header_cell("Source"),
        ui::header_cell("History"),
    ]);

    for asset in catalog.iter() {
        let history = match (
            store.earliest(&asset.asset_id)?,
            store.latest(&asset.asset_id)?,
        ) {
            (Some(first), Some(last)) => Cell::new(format!("{first} .. {last}")),
            _ => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(&asset.asset_id),
            Cell::new(&asset.display_name),
            Cell::new(asset.category),
            Cell::new(source_label(&asset.source_binding)),
            history,
        ]);
    }
    Ok(table)
}

pub fn run(catalog: &Catalog, store: &dyn TimeSeriesStore) -> Result<()> {
    println!("{}", catalog_table(catalog, store)?);
    Ok(())
}
