use super::ui;
use crate::core::asset::Catalog;
use crate::core::series::TimeSeriesStore;
use crate::import::import_file;
use anyhow::Result;
use std::path::Path;

pub fn run(catalog: &Catalog, store: &dyn TimeSeriesStore, asset_id: &str, path: &Path) -> Result<()> {
    let written = import_file(catalog, store, asset_id, path)?;
    let span = store.earliest(asset_id)?.zip(store.latest(asset_id)?);

    println!(
        "{} {} observation(s) for {}",
        ui::style_text("Imported", ui::StyleType::TotalLabel),
        ui::style_text(&written.to_string(), ui::StyleType::TotalValue),
        asset_id
    );
    if let Some((first, last)) = span {
        println!(
            "{}",
            ui::style_text(&format!("History now spans {first} .. {last}"), ui::StyleType::Subtle)
        );
    }
    Ok(())
}
