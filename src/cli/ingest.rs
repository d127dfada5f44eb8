use super::ui;
use crate::core::asset::Catalog;
use crate::core::series::TimeSeriesStore;
use crate::core::source::SourceFetcher;
use crate::ingest::{AssetOutcome, IngestionReport, IngestionSettings, run_ingestion_with_progress};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table};

pub(crate) fn report_table(catalog: &Catalog, report: &IngestionReport) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Stored"),
        ui::header_cell("Pruned"),
        ui::header_cell("Status"),
    ]);

    for (asset_id, outcome) in &report.outcomes {
        let name = catalog
            .get(asset_id)
            .map_or(asset_id.as_str(), |a| a.display_name.as_str());
        let pruned = report
            .prune
            .outcomes
            .iter()
            .find(|(id, _)| id == asset_id)
            .map(|(_, r)| r);

        let mut row = vec![Cell::new(name)];
        row.push(match outcome {
            AssetOutcome::Stored { written } => {
                Cell::new(written).set_alignment(CellAlignment::Right)
            }
            AssetOutcome::Skipped(_) => ui::na_cell(true),
        });
        row.push(match pruned {
            Some(Ok(removed)) => Cell::new(removed).set_alignment(CellAlignment::Right),
            Some(Err(_)) => ui::na_cell(true),
            None => ui::na_cell(false),
        });
        row.push(match (outcome, pruned) {
            (AssetOutcome::Skipped(e), _) => ui::error_cell(&e.to_string()),
            (_, Some(Err(e))) => ui::error_cell(&e.to_string()),
            _ => Cell::new("OK"),
        });
        table.add_row(row);
    }
    table
}

pub async fn run(
    catalog: &Catalog,
    fetcher: &dyn SourceFetcher,
    store: &dyn TimeSeriesStore,
    settings: IngestionSettings,
    as_of: NaiveDate,
) -> IngestionReport {
    let pb = ui::new_progress_bar(catalog.len() as u64);
    pb.set_message(format!("Collecting prices for {as_of}"));

    let report = run_ingestion_with_progress(catalog, fetcher, store, settings, as_of, &|_, _| {
        pb.inc(1)
    })
    .await;
    pb.finish_and_clear();

    println!(
        "\n{}",
        ui::style_text(&format!("Ingestion for {as_of}"), ui::StyleType::Title)
    );
    println!("{}", report_table(catalog, &report));
    println!(
        "{} {}   {} {}",
        ui::style_text("Stored:", ui::StyleType::TotalLabel),
        ui::style_text(&report.written().to_string(), ui::StyleType::TotalValue),
        ui::style_text("Pruned before:", ui::StyleType::TotalLabel),
        ui::style_text(&report.prune.cutoff.to_string(), ui::StyleType::Subtle),
    );
    report
}
