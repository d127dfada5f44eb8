//! Conversion of provider payloads into canonical observations.
//!
//! Each source shape has its own [`Normalizer`]; the asset's
//! [`SourceBinding`] picks which one reads a payload.

pub mod alphavantage;
pub mod exchange_rate;
pub mod flat_list;
pub mod spot;

use crate::core::asset::{AssetDescriptor, SourceBinding};
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::source::RawPayload;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub trait Normalizer: Send + Sync {
    /// Extracts observations for `asset_id`, ascending by date.
    ///
    /// Unusable points are dropped; an error is reserved for payloads whose
    /// overall shape is not recognized.
    fn normalize(&self, asset_id: &str, payload: &RawPayload)
    -> Result<Vec<Observation>, AssetError>;
}

pub fn normalizer_for(binding: &SourceBinding) -> Box<dyn Normalizer> {
    match binding {
        SourceBinding::AlphaVantageDaily {
            multiplier, offset, ..
        } => Box::new(alphavantage::AlphaVantageDaily::new(*multiplier, *offset)),
        SourceBinding::SpotPrice { .. } => Box::new(spot::SpotPrice),
        SourceBinding::ExchangeRate { base, quote } => {
            Box::new(exchange_rate::ExchangeRate::new(base, quote))
        }
        SourceBinding::FlatList => Box::new(flat_list::FlatList),
    }
}

pub fn normalize(
    asset: &AssetDescriptor,
    payload: &RawPayload,
) -> Result<Vec<Observation>, AssetError> {
    normalizer_for(&asset.source_binding).normalize(&asset.asset_id, payload)
}

/// Coerces the date representations seen across providers.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past year 5138 in seconds is taken as milliseconds
            let seconds = if raw.abs() >= 100_000_000_000 {
                raw / 1000
            } else {
                raw
            };
            DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

pub(crate) fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Coerces JSON numbers and numeric strings.
pub(crate) fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Collects candidate points into a sorted series.
///
/// Later duplicates of a date replace earlier ones; points without a valid
/// date or positive price are dropped.
#[derive(Default)]
pub(crate) struct SeriesBuilder {
    points: BTreeMap<NaiveDate, f64>,
    dropped: usize,
}

impl SeriesBuilder {
    pub fn push(&mut self, date: Option<NaiveDate>, price: Option<f64>) {
        match date.zip(price).and_then(|(d, p)| Observation::new(d, p)) {
            Some(observation) => {
                self.points.insert(observation.date, observation.price);
            }
            None => self.dropped += 1,
        }
    }

    pub fn finish(self, asset_id: &str) -> Vec<Observation> {
        if self.dropped > 0 {
            debug!("Dropped {} unusable point(s) for {}", self.dropped, asset_id);
        }
        self.points
            .into_iter()
            .map(|(date, price)| Observation { date, price })
            .collect()
    }
}
