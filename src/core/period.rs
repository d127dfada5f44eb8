//! Named lookback windows and their resolution against stored history

use crate::core::error::{AssetError, QueryError};
use crate::core::series::TimeSeriesStore;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PeriodToken {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
}

impl Display for PeriodToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PeriodToken::OneWeek => "1W",
                PeriodToken::OneMonth => "1M",
                PeriodToken::ThreeMonths => "3M",
                PeriodToken::SixMonths => "6M",
                PeriodToken::OneYear => "1Y",
                PeriodToken::ThreeYears => "3Y",
                PeriodToken::FiveYears => "5Y",
            }
        )
    }
}

impl PeriodToken {
    pub const ALL: [PeriodToken; 7] = [
        PeriodToken::OneWeek,
        PeriodToken::OneMonth,
        PeriodToken::ThreeMonths,
        PeriodToken::SixMonths,
        PeriodToken::OneYear,
        PeriodToken::ThreeYears,
        PeriodToken::FiveYears,
    ];

    pub fn to_duration(&self) -> Duration {
        match self {
            PeriodToken::OneWeek => Duration::days(7),
            PeriodToken::OneMonth => Duration::days(30),
            PeriodToken::ThreeMonths => Duration::days(90),
            PeriodToken::SixMonths => Duration::days(180),
            PeriodToken::OneYear => Duration::days(365),
            PeriodToken::ThreeYears => Duration::days(365 * 3),
            PeriodToken::FiveYears => Duration::days(365 * 5),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodToken::OneWeek => "1 Week",
            PeriodToken::OneMonth => "1 Month",
            PeriodToken::ThreeMonths => "3 Months",
            PeriodToken::SixMonths => "6 Months",
            PeriodToken::OneYear => "1 Year",
            PeriodToken::ThreeYears => "3 Years",
            PeriodToken::FiveYears => "5 Years",
        }
    }
}

impl FromStr for PeriodToken {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodToken::ALL
            .into_iter()
            .find(|token| token.to_string() == s)
            .ok_or_else(|| QueryError::UnknownPeriod(s.to_string()))
    }
}

/// Concrete inclusive date range for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolves `token` against the history stored for `asset_id`.
///
/// The start clamps to the earliest stored observation and the end clamps
/// to the latest one, so the window never extends past real data.
pub fn resolve(
    store: &dyn TimeSeriesStore,
    asset_id: &str,
    token: PeriodToken,
    as_of: NaiveDate,
) -> Result<Period, AssetError> {
    let no_data = || AssetError::NoData {
        asset_id: asset_id.to_string(),
    };

    let earliest = store
        .earliest(asset_id)
        .map_err(|e| AssetError::storage(asset_id, e))?
        .ok_or_else(no_data)?;
    let latest = store
        .latest(asset_id)
        .map_err(|e| AssetError::storage(asset_id, e))?
        .ok_or_else(no_data)?;

    // Lookbacks reaching before the calendar's first day start there instead
    let nominal_start = as_of
        .checked_sub_signed(token.to_duration())
        .unwrap_or(NaiveDate::MIN);
    let start = nominal_start.max(earliest);
    let end = as_of.min(latest);

    if start > end {
        debug!(
            "No history for {asset_id} within {token}: window {start}..{end}, stored {earliest}..{latest}"
        );
        return Err(no_data());
    }

    Ok(Period { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::Observation;
    use crate::store::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with(asset_id: &str, dates: &[NaiveDate]) -> MemoryStore {
        let store = MemoryStore::new();
        let observations: Vec<_> = dates
            .iter()
            .map(|d| Observation::new(*d, 100.0).unwrap())
            .collect();
        store.upsert(asset_id, &observations).unwrap();
        store
    }

    #[test]
    fn test_token_parsing() {
        assert_eq!("1W".parse::<PeriodToken>(), Ok(PeriodToken::OneWeek));
        assert_eq!("6M".parse::<PeriodToken>(), Ok(PeriodToken::SixMonths));
        assert_eq!("5Y".parse::<PeriodToken>(), Ok(PeriodToken::FiveYears));
        for bad in ["1D", "10Y", "1w", "", "1 Year"] {
            assert_eq!(
                bad.parse::<PeriodToken>(),
                Err(QueryError::UnknownPeriod(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_lookbacks() {
        let days: Vec<i64> = PeriodToken::ALL
            .iter()
            .map(|t| t.to_duration().num_days())
            .collect();
        assert_eq!(days, vec![7, 30, 90, 180, 365, 1095, 1825]);
    }

    #[test]
    fn test_resolve_full_window() {
        let store = store_with("A", &[day(2020, 1, 1), day(2024, 1, 8)]);
        let period = resolve(&store, "A", PeriodToken::OneWeek, day(2024, 1, 8)).unwrap();
        assert_eq!(
            period,
            Period {
                start: day(2024, 1, 1),
                end: day(2024, 1, 8)
            }
        );
    }

    #[test]
    fn test_resolve_clamps_start_to_earliest() {
        let d_min = day(2023, 7, 1);
        let store = store_with("A", &[d_min, day(2024, 1, 1)]);
        let period = resolve(&store, "A", PeriodToken::ThreeYears, day(2024, 1, 1)).unwrap();
        assert_eq!(period.start, d_min);
        assert_eq!(period.end, day(2024, 1, 1));
    }

    #[test]
    fn test_resolve_clamps_end_when_as_of_has_no_data_yet() {
        let store = store_with("A", &[day(2024, 1, 1), day(2024, 1, 5)]);
        let period = resolve(&store, "A", PeriodToken::OneMonth, day(2024, 1, 8)).unwrap();
        assert_eq!(period.end, day(2024, 1, 5));
    }

    #[test]
    fn test_resolve_no_data() {
        let store = MemoryStore::new();
        assert_eq!(
            resolve(&store, "A", PeriodToken::OneYear, day(2024, 1, 1)),
            Err(AssetError::NoData {
                asset_id: "A".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_history_entirely_before_window() {
        let store = store_with("A", &[day(2020, 1, 1), day(2020, 6, 1)]);
        let result = resolve(&store, "A", PeriodToken::OneWeek, day(2024, 1, 1));
        assert!(matches!(result, Err(AssetError::NoData { .. })));
    }

    #[test]
    fn test_resolve_lookback_past_calendar_start() {
        let first = NaiveDate::MIN;
        let last = first + Duration::days(10);
        let store = store_with("A", &[first, last]);
        let period = resolve(&store, "A", PeriodToken::FiveYears, last).unwrap();
        assert_eq!(period, Period { start: first, end: last });
    }
}
