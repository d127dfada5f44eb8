//! Storage contract for per-asset price series

use crate::core::observation::Observation;
use anyhow::Result;
use chrono::NaiveDate;

/// Durable keyed storage of observations, one series per `asset_id`.
///
/// Every write call is applied atomically: a concurrent reader sees the
/// series either before or after the whole batch.
pub trait TimeSeriesStore: Send + Sync {
    /// Inserts each observation, overwriting the price of a date already
    /// present. Returns the number of observations written.
    fn upsert(&self, asset_id: &str, observations: &[Observation]) -> Result<usize>;

    /// Observations with `start <= date <= end`, ascending by date.
    fn range_query(&self, asset_id: &str, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<Observation>>;

    fn earliest(&self, asset_id: &str) -> Result<Option<NaiveDate>>;

    fn latest(&self, asset_id: &str) -> Result<Option<NaiveDate>>;

    /// Removes observations strictly older than `cutoff`, returning how many
    /// were removed.
    fn delete_before(&self, asset_id: &str, cutoff: NaiveDate) -> Result<usize>;
}
