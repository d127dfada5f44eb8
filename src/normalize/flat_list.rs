use super::{Normalizer, SeriesBuilder, parse_date, parse_price};
use crate::core::error::AssetError;
use crate::core::observation::Observation;
use crate::core::source::RawPayload;
use serde_json::Value;

/// Reads lists of points, either `[date, price]` pairs or objects with a
/// `date` and a `price` (or `close`) field. The list may be wrapped as
/// `{"data": [...]}`.
pub struct FlatList;

fn point_fields(point: &Value) -> (Option<&Value>, Option<&Value>) {
    match point {
        Value::Array(pair) if pair.len() == 2 => (pair.first(), pair.get(1)),
        Value::Object(fields) => (
            fields.get("date"),
            fields.get("price").or_else(|| fields.get("close")),
        ),
        _ => (None, None),
    }
}

impl Normalizer for FlatList {
    fn normalize(
        &self,
        asset_id: &str,
        payload: &RawPayload,
    ) -> Result<Vec<Observation>, AssetError> {
        let points = match &payload.body {
            Value::Array(points) => points,
            Value::Object(wrapper) => wrapper
                .get("data")
                .and_then(|d| d.as_array())
                .ok_or_else(|| AssetError::malformed(asset_id, "expected a 'data' list"))?,
            _ => return Err(AssetError::malformed(asset_id, "expected a list of points")),
        };

        let mut builder = SeriesBuilder::default();
        for point in points {
            let (date, price) = point_fields(point);
            builder.push(date.and_then(parse_date), price.and_then(parse_price));
        }
        Ok(builder.finish(asset_id))
    }
}
