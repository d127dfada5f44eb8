use super::{Normalizer, SeriesBuilder, parse_price, round_to};
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::source::RawPayload;

/// Reads ExchangeRate-API `latest` tables and derives `base -> quote`.
///
/// Tables are quoted against the request currency, so the pair rate is
/// `rate(quote) / rate(base)` regardless of which currency the table uses.
pub struct ExchangeRate {
    base: String,
    quote: String,
}

impl ExchangeRate {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
        }
    }
}

impl Normalizer for ExchangeRate {
    fn normalize(
        &self,
        asset_id: &str,
        payload: &RawPayload,
    ) -> Result<Vec<Observation>, AssetError> {
        let rates = payload
            .body
            .get("conversion_rates")
            .and_then(|r| r.as_object())
            .ok_or_else(|| AssetError::malformed(asset_id, "missing 'conversion_rates'"))?;

        let base = rates.get(&self.base).and_then(parse_price);
        let quote = rates.get(&self.quote).and_then(parse_price);

        let mut builder = SeriesBuilder::default();
        let rate = match (base, quote) {
            (Some(base), Some(quote)) if base > 0.0 => Some(round_to(quote / base, 5)),
            _ => None,
        };
        builder.push(Some(payload.observed_on), rate);
        Ok(builder.finish(asset_id))
    }
}
