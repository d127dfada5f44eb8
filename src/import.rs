//! Bulk loading of historical prices from local files.

use crate::core::asset::{AssetDescriptor, Catalog, SourceBinding};
use crate::core::error::AssetError;
use crate::core::series::TimeSeriesStore;
use crate::core::source::RawPayload;
use crate::normalize::{Normalizer, flat_list::FlatList};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::{Value, json};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Symbols a multi-asset file may use for `asset`.
fn accepted_symbols(asset: &AssetDescriptor) -> Vec<String> {
    let mut symbols = vec![asset.asset_id.clone()];
    match &asset.source_binding {
        SourceBinding::AlphaVantageDaily { symbol, .. } | SourceBinding::SpotPrice { symbol } => {
            symbols.push(symbol.clone())
        }
        SourceBinding::ExchangeRate { base, quote } => {
            symbols.push(format!("{base}{quote}"));
            symbols.push(format!("{base}/{quote}"));
        }
        SourceBinding::FlatList => {}
    }
    symbols
}

/// Reads `date` and `price` (or `close`) columns into a flat list of points.
///
/// Files carrying a `symbol` column may mix assets; only rows whose symbol
/// names `asset` are kept.
fn read_csv(asset: &AssetDescriptor, path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header from {}", path.display()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let date_col = column("date").context("CSV has no 'date' column")?;
    let price_col = column("price")
        .or_else(|| column("close"))
        .context("CSV has no 'price' or 'close' column")?;
    let symbol_col = column("symbol");
    let symbols = accepted_symbols(asset);

    let mut points = Vec::new();
    let mut rows = 0;
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read row in {}", path.display()))?;
        rows += 1;
        if let Some(col) = symbol_col {
            let symbol = record.get(col).unwrap_or_default();
            if !symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)) {
                continue;
            }
        }
        points.push(json!({
            "date": record.get(date_col).unwrap_or_default(),
            "price": record.get(price_col).unwrap_or_default(),
        }));
    }

    if rows > 0 && points.is_empty() {
        bail!(
            "No rows in {} match {} (symbols: {})",
            path.display(),
            asset.asset_id,
            symbols.join(", ")
        );
    }
    Ok(Value::Array(points))
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads a CSV or JSON price history for `asset_id` and upserts it as one
/// batch. Returns the number of observations written.
pub fn import_file(
    catalog: &Catalog,
    store: &dyn TimeSeriesStore,
    asset_id: &str,
    path: &Path,
) -> Result<usize> {
    let asset = catalog
        .get(asset_id)
        .ok_or_else(|| AssetError::UnknownAsset {
            asset_id: asset_id.to_string(),
        })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let body = match extension.as_deref() {
        Some("csv") => read_csv(asset, path)?,
        Some("json") => read_json(path)?,
        _ => bail!("Unsupported import file type: {}", path.display()),
    };

    let payload = RawPayload::new(body, Utc::now().date_naive());
    let observations = FlatList.normalize(asset_id, &payload)?;
    let written = store
        .upsert(asset_id, &observations)
        .with_context(|| format!("Failed to store imported prices for {asset_id}"))?;

    info!(asset = asset_id, written, file = %path.display(), "Imported price history");
    Ok(written)
}
