//! Fetch abstractions for raw provider payloads

use crate::core::asset::AssetDescriptor;
use crate::core::error::AssetError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Provider response attributed to exactly one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub body: serde_json::Value,
    /// Date assigned to point-in-time quotes that carry no date of their own.
    pub observed_on: NaiveDate,
}

impl RawPayload {
    pub fn new(body: serde_json::Value, observed_on: NaiveDate) -> Self {
        Self { body, observed_on }
    }
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_raw(
        &self,
        asset: &AssetDescriptor,
        as_of: NaiveDate,
    ) -> Result<RawPayload, AssetError>;
}
