use crate::core::observation::Observation;
use crate::core::series::TimeSeriesStore;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use tracing::debug;

/// In-memory store backed by one ordered map per asset.
///
/// Each write holds the write lock for the whole batch.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, BTreeMap<NaiveDate, f64>>>,
}

impl MemoryStore {
    /// Creates a new empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("Memory store lock poisoned")
}

impl TimeSeriesStore for MemoryStore {
    fn upsert(&self, asset_id: &str, observations: &[Observation]) -> Result<usize> {
        let mut series = self.inner.write().map_err(poisoned)?;
        let entry = series.entry(asset_id.to_string()).or_default();
        for observation in observations {
            entry.insert(observation.date, observation.price);
        }
        debug!("Memory UPSERT {} observation(s) for {}", observations.len(), asset_id);
        Ok(observations.len())
    }

    fn range_query(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        if start > end {
            return Ok(Vec::new());
        }
        let series = self.inner.read().map_err(poisoned)?;
        Ok(series
            .get(asset_id)
            .map(|points| {
                points
                    .range(start..=end)
                    .map(|(date, price)| Observation {
                        date: *date,
                        price: *price,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn earliest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
        let series = self.inner.read().map_err(poisoned)?;
        Ok(series
            .get(asset_id)
            .and_then(|points| points.keys().next().copied()))
    }

    fn latest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
        let series = self.inner.read().map_err(poisoned)?;
        Ok(series
            .get(asset_id)
            .and_then(|points| points.keys().next_back().copied()))
    }

    fn delete_before(&self, asset_id: &str, cutoff: NaiveDate) -> Result<usize> {
        let mut series = self.inner.write().map_err(poisoned)?;
        let Some(points) = series.get_mut(asset_id) else {
            return Ok(0);
        };
        let kept = points.split_off(&cutoff);
        let removed = points.len();
        *points = kept;
        debug!("Memory DELETE {} observation(s) for {}", removed, asset_id);
        Ok(removed)
    }
}
