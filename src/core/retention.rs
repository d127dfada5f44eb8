use crate::core::asset::Catalog;
use crate::core::error::AssetError;
use crate::core::series::TimeSeriesStore;
use chrono::{Months, NaiveDate};
use tracing::{info, warn};

pub const DEFAULT_RETENTION_YEARS: u32 = 5;

/// Per-asset outcome of one pruning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneReport {
    pub cutoff: NaiveDate,
    pub outcomes: Vec<(String, Result<usize, AssetError>)>,
}

impl PruneReport {
    pub fn removed(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .sum()
    }
}

/// First date kept when retaining `retention_years` calendar years.
pub fn cutoff_date(as_of: NaiveDate, retention_years: u32) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(retention_years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Deletes observations older than the retention horizon for every asset.
///
/// A failing asset is logged and recorded; the remaining assets are still
/// pruned.
pub fn prune_all(
    catalog: &Catalog,
    store: &dyn TimeSeriesStore,
    retention_years: u32,
    as_of: NaiveDate,
) -> PruneReport {
    let cutoff = cutoff_date(as_of, retention_years);
    let outcomes = catalog
        .iter()
        .map(|asset| {
            let result = store
                .delete_before(&asset.asset_id, cutoff)
                .map_err(|e| AssetError::storage(&asset.asset_id, e));
            match &result {
                Ok(removed) if *removed > 0 => {
                    info!(asset = %asset.asset_id, removed, %cutoff, "Pruned old observations")
                }
                Ok(_) => {}
                Err(e) => warn!(asset = %asset.asset_id, error = %e, "Pruning failed"),
            }
            (asset.asset_id.clone(), result)
        })
        .collect();

    PruneReport { cutoff, outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{AssetDescriptor, Category, SourceBinding};
    use crate::core::observation::Observation;
    use crate::store::MemoryStore;
    use anyhow::{Result, anyhow};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog(ids: &[&str]) -> Catalog {
        Catalog::new(
            ids.iter()
                .map(|id| AssetDescriptor::new(id, id, Category::Crypto, SourceBinding::FlatList))
                .collect(),
        )
    }

    #[test]
    fn test_cutoff_uses_calendar_years() {
        assert_eq!(cutoff_date(day(2024, 6, 15), 5), day(2019, 6, 15));
        assert_eq!(cutoff_date(day(2024, 2, 29), 5), day(2019, 2, 28));
        assert_eq!(cutoff_date(day(2024, 2, 29), 4), day(2020, 2, 29));
    }

    #[test]
    fn test_prune_removes_only_older_than_horizon() {
        let store = MemoryStore::new();
        let as_of = day(2024, 6, 15);
        let dates = [
            day(2018, 1, 1),
            day(2019, 6, 14),
            day(2019, 6, 15),
            day(2022, 1, 1),
            day(2024, 6, 15),
        ];
        for id in ["A", "B"] {
            let observations: Vec<_> = dates
                .iter()
                .map(|d| Observation::new(*d, 1.0).unwrap())
                .collect();
            store.upsert(id, &observations).unwrap();
        }

        let report = prune_all(&catalog(&["A", "B"]), &store, 5, as_of);
        assert_eq!(report.cutoff, day(2019, 6, 15));
        assert_eq!(report.removed(), 4);

        for id in ["A", "B"] {
            let kept: Vec<_> = store
                .range_query(id, NaiveDate::MIN, NaiveDate::MAX)
                .unwrap()
                .into_iter()
                .map(|o| o.date)
                .collect();
            assert_eq!(kept, vec![day(2019, 6, 15), day(2022, 1, 1), day(2024, 6, 15)]);
        }
    }

    struct FailingStore {
        inner: MemoryStore,
        failing: &'static str,
    }

    impl TimeSeriesStore for FailingStore {
        fn upsert(&self, asset_id: &str, observations: &[Observation]) -> Result<usize> {
            self.inner.upsert(asset_id, observations)
        }
        fn range_query(
            &self,
            asset_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Observation>> {
            self.inner.range_query(asset_id, start, end)
        }
        fn earliest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
            self.inner.earliest(asset_id)
        }
        fn latest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
            self.inner.latest(asset_id)
        }
        fn delete_before(&self, asset_id: &str, cutoff: NaiveDate) -> Result<usize> {
            if asset_id == self.failing {
                return Err(anyhow!("disk full"));
            }
            self.inner.delete_before(asset_id, cutoff)
        }
    }

    #[test]
    fn test_prune_failure_is_isolated_per_asset() {
        let store = FailingStore {
            inner: MemoryStore::new(),
            failing: "A",
        };
        let old = [Observation::new(day(2000, 1, 1), 1.0).unwrap()];
        store.upsert("A", &old).unwrap();
        store.upsert("B", &old).unwrap();

        let report = prune_all(&catalog(&["A", "B"]), &store, 5, day(2024, 1, 1));
        assert!(matches!(report.outcomes[0].1, Err(AssetError::Storage { .. })));
        assert_eq!(report.outcomes[1].1, Ok(1));
        assert_eq!(store.earliest("B").unwrap(), None);
        assert_eq!(store.earliest("A").unwrap(), Some(day(2000, 1, 1)));
    }
}
