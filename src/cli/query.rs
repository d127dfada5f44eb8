use super::ui;
use crate::core::asset::{Catalog, Category};
use crate::core::compare::{self, ComparisonResult};
use crate::core::series::TimeSeriesStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use std::collections::BTreeMap;

pub struct QueryArgs {
    pub category: String,
    pub assets: Vec<String>,
    pub period: String,
    pub as_of: NaiveDate,
    pub series: bool,
}

fn display_name<'a>(catalog: &'a Catalog, asset_id: &'a str) -> &'a str {
    catalog
        .get(asset_id)
        .map_or(asset_id, |a| a.display_name.as_str())
}

/// Heading such as "Rare Materials over 1 Week"; `All` stays as given.
pub(crate) fn title(category: &str, result: &ComparisonResult) -> String {
    let label = category
        .parse::<Category>()
        .map_or(category, |c| c.label());
    format!("{label} over {}", result.period.label())
}

pub(crate) fn metrics_table(catalog: &Catalog, result: &ComparisonResult) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Start"),
        ui::header_cell("Latest"),
        ui::header_cell("Change"),
    ]);

    for (asset_id, outcome) in &result.entries {
        let name = Cell::new(display_name(catalog, asset_id));
        match outcome {
            Ok(m) => {
                table.add_row(vec![
                    name,
                    Cell::new(m.period.start),
                    Cell::new(m.period.end),
                    ui::price_cell(m.window_start_price),
                    ui::price_cell(m.latest_price),
                    ui::change_cell(
                        ui::format_delta(m.absolute_delta, m.percent_delta),
                        m.percent_delta,
                    ),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    name,
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::error_cell(&e.to_string()),
                ]);
            }
        }
    }
    table
}

/// Scaled change of every successful asset, one row per date.
pub(crate) fn series_table(catalog: &Catalog, result: &ComparisonResult) -> Table {
    let successes: Vec<_> = result.successes().collect();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (column, metrics) in successes.iter().enumerate() {
        for point in &metrics.scaled {
            rows.entry(point.date)
                .or_insert_with(|| vec![None; successes.len()])[column] = Some(point.change);
        }
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date")];
    header.extend(
        successes
            .iter()
            .map(|m| ui::header_cell(display_name(catalog, &m.asset_id))),
    );
    table.set_header(header);

    for (date, changes) in rows {
        let mut row = vec![Cell::new(date)];
        row.extend(changes.into_iter().map(|change| match change {
            Some(c) => ui::change_cell(format!("{c:+.2}%"), c),
            None => ui::na_cell(false),
        }));
        table.add_row(row);
    }
    table
}

pub fn run(catalog: &Catalog, store: &dyn TimeSeriesStore, args: QueryArgs) -> Result<()> {
    let result = compare::query(
        catalog,
        store,
        &args.category,
        args.assets,
        &args.period,
        args.as_of,
    )?;

    println!(
        "\n{} {}",
        ui::style_text(
            &title(&args.category, &result),
            ui::StyleType::Title
        ),
        ui::style_text(&format!("as of {}", result.as_of), ui::StyleType::Subtle)
    );

    if result.is_empty() {
        println!("No assets selected.");
        return Ok(());
    }
    println!("{}", metrics_table(catalog, &result));

    if args.series && result.successes().next().is_some() {
        ui::print_separator();
        println!("{}", series_table(catalog, &result));
    }

    let failed = result.len() - result.successes().count();
    if failed > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("{failed} of {} asset(s) could not be compared", result.len()),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
