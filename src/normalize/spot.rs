use super::{Normalizer, SeriesBuilder, parse_price, round_to};
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::source::RawPayload;

/// Reads single-quote responses such as `{"name": "Gold", "price": 2650.1}`.
///
/// The quote carries no trading date, so it is attributed to the payload's
/// observation date.
pub struct SpotPrice;

impl Normalizer for SpotPrice {
    fn normalize(
        &self,
        asset_id: &str,
        payload: &RawPayload,
    ) -> Result<Vec<Observation>, AssetError> {
        let body = payload
            .body
            .as_object()
            .ok_or_else(|| AssetError::malformed(asset_id, "expected a JSON object"))?;

        let mut builder = SeriesBuilder::default();
        if let Some(price) = body.get("price") {
            builder.push(
                Some(payload.observed_on),
                parse_price(price).map(|p| round_to(p, 2)),
            );
        }
        Ok(builder.finish(asset_id))
    }
}
