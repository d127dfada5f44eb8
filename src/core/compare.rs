//! Fans metrics computation out over a selection of assets.
use crate::core::asset::{Catalog, Category};
use crate::core::error::{AssetError, QueryError};
use crate::core::metrics::{self, MetricsResult};
use crate::core::period::{self, PeriodToken};
use crate::core::series::TimeSeriesStore;
use chrono::NaiveDate;
use tracing::debug;

/// Category literal selecting an explicit cross-category list.
pub const ALL_ASSETS: &str = "All";

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Every asset of the category, or the given subset of it.
    Category(Category, Vec<String>),
    /// Explicit cross-category selection; empty means nothing selected.
    Assets(Vec<String>),
}

impl Selection {
    /// Parses a category literal (`Currency`, ..., or `All`).
    pub fn parse(category: &str, asset_ids: Vec<String>) -> Result<Self, QueryError> {
        if category == ALL_ASSETS {
            return Ok(Selection::Assets(asset_ids));
        }
        Ok(Selection::Category(category.parse()?, asset_ids))
    }
}

/// Per-asset outcome of a comparison, in selection order.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub period: PeriodToken,
    pub as_of: NaiveDate,
    pub entries: Vec<(String, Result<MetricsResult, AssetError>)>,
}

impl ComparisonResult {
    pub fn get(&self, asset_id: &str) -> Option<&Result<MetricsResult, AssetError>> {
        self.entries
            .iter()
            .find(|(id, _)| id == asset_id)
            .map(|(_, result)| result)
    }

    pub fn successes(&self) -> impl Iterator<Item = &MetricsResult> {
        self.entries.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn selected_ids(catalog: &Catalog, selection: &Selection) -> Vec<(String, Option<AssetError>)> {
    let mut seen: Vec<(String, Option<AssetError>)> = Vec::new();
    let mut push = |id: &str, failure: Option<AssetError>| {
        if !seen.iter().any(|(s, _)| s == id) {
            seen.push((id.to_string(), failure));
        }
    };

    match selection {
        Selection::Category(category, ids) if ids.is_empty() => {
            for asset in catalog.in_category(*category) {
                push(&asset.asset_id, None);
            }
        }
        Selection::Category(category, ids) => {
            for id in ids {
                let failure = match catalog.get(id) {
                    None => Some(AssetError::UnknownAsset {
                        asset_id: id.clone(),
                    }),
                    Some(asset) if asset.category != *category => {
                        Some(AssetError::CategoryMismatch {
                            asset_id: id.clone(),
                            category: category.to_string(),
                        })
                    }
                    Some(_) => None,
                };
                push(id, failure);
            }
        }
        Selection::Assets(ids) => {
            for id in ids {
                let failure = catalog.get(id).is_none().then(|| AssetError::UnknownAsset {
                    asset_id: id.clone(),
                });
                push(id, failure);
            }
        }
    }
    seen
}

/// Resolves and computes every selected asset independently.
pub fn compare(
    catalog: &Catalog,
    store: &dyn TimeSeriesStore,
    selection: &Selection,
    token: PeriodToken,
    as_of: NaiveDate,
) -> ComparisonResult {
    let entries = selected_ids(catalog, selection)
        .into_iter()
        .map(|(asset_id, failure)| {
            let result = match failure {
                Some(e) => Err(e),
                None => period::resolve(store, &asset_id, token, as_of)
                    .and_then(|window| metrics::compute(store, &asset_id, window)),
            };
            if let Err(e) = &result {
                debug!("Excluding {} from comparison: {}", asset_id, e);
            }
            (asset_id, result)
        })
        .collect();

    ComparisonResult {
        period: token,
        as_of,
        entries,
    }
}

/// Query boundary: validates the literals before any store access.
pub fn query(
    catalog: &Catalog,
    store: &dyn TimeSeriesStore,
    category: &str,
    asset_ids: Vec<String>,
    period_token: &str,
    as_of: NaiveDate,
) -> Result<ComparisonResult, QueryError> {
    let token: PeriodToken = period_token.parse()?;
    let selection = Selection::parse(category, asset_ids)?;
    Ok(compare(catalog, store, &selection, token, as_of))
}
