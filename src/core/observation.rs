use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price point of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
}

impl Observation {
    /// Builds an observation, rejecting prices that are not finite and
    /// strictly positive.
    pub fn new(date: NaiveDate, price: f64) -> Option<Self> {
        if price.is_finite() && price > 0.0 {
            Some(Self { date, price })
        } else {
            None
        }
    }
}
