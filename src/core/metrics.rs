//! Window-relative performance metrics for a single asset.
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::period::Period;
use crate::core::series::TimeSeriesStore;
use chrono::NaiveDate;
use serde::Serialize;

/// Percentage change of one observation against the window baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledPoint {
    pub date: NaiveDate,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsResult {
    pub asset_id: String,
    pub period: Period,
    pub latest_price: f64,
    pub window_start_price: f64,
    pub absolute_delta: f64,
    pub percent_delta: f64,
    pub raw: Vec<Observation>,
    pub scaled: Vec<ScaledPoint>,
}

/// Reads the window from the store and derives its metrics.
pub fn compute(
    store: &dyn TimeSeriesStore,
    asset_id: &str,
    period: Period,
) -> Result<MetricsResult, AssetError> {
    let observations = store
        .range_query(asset_id, period.start, period.end)
        .map_err(|e| AssetError::storage(asset_id, e))?;
    from_observations(asset_id, period, observations)
}

/// Derives metrics from an ascending window of observations.
///
/// The baseline is the first observation of the window, never of the
/// whole series.
pub fn from_observations(
    asset_id: &str,
    period: Period,
    observations: Vec<Observation>,
) -> Result<MetricsResult, AssetError> {
    let (first, last) = match observations.as_slice() {
        [first, .., last] => (*first, *last),
        _ => {
            return Err(AssetError::InsufficientData {
                asset_id: asset_id.to_string(),
                points: observations.len(),
            });
        }
    };

    let baseline = first.price;
    if baseline == 0.0 {
        return Err(AssetError::DegenerateBaseline {
            asset_id: asset_id.to_string(),
        });
    }

    let scaled = observations
        .iter()
        .map(|o| ScaledPoint {
            date: o.date,
            change: (o.price - baseline) / baseline * 100.0,
        })
        .collect();

    let absolute_delta = last.price - baseline;
    Ok(MetricsResult {
        asset_id: asset_id.to_string(),
        period,
        latest_price: last.price,
        window_start_price: baseline,
        absolute_delta,
        percent_delta: absolute_delta / baseline * 100.0,
        raw: observations,
        scaled,
    })
}
