use super::{Normalizer, SeriesBuilder, parse_date_str, parse_price, round_to};
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::source::RawPayload;

const SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

/// Reads Alpha Vantage `TIME_SERIES_DAILY` responses: a mapping from date to
/// OHLCV fields, all encoded as strings.
pub struct AlphaVantageDaily {
    multiplier: f64,
    offset: f64,
}

impl AlphaVantageDaily {
    pub fn new(multiplier: f64, offset: f64) -> Self {
        Self { multiplier, offset }
    }
}

impl Normalizer for AlphaVantageDaily {
    fn normalize(
        &self,
        asset_id: &str,
        payload: &RawPayload,
    ) -> Result<Vec<Observation>, AssetError> {
        let series = payload
            .body
            .get(SERIES_KEY)
            .and_then(|s| s.as_object())
            .ok_or_else(|| AssetError::malformed(asset_id, format!("missing '{SERIES_KEY}'")))?;

        let mut builder = SeriesBuilder::default();
        for (date, fields) in series {
            let price = fields
                .get(CLOSE_KEY)
                .and_then(parse_price)
                .map(|close| round_to(close * self.multiplier + self.offset, 2));
            builder.push(parse_date_str(date), price);
        }
        Ok(builder.finish(asset_id))
    }
}
