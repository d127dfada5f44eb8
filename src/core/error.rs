//! Failure taxonomy shared by ingestion and query paths.

use thiserror::Error;

/// A failure scoped to a single asset.
///
/// These never abort a batch: ingestion records them in its report and the
/// comparison aggregator stores them next to the successful results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Malformed payload for {asset_id}: {reason}")]
    MalformedPayload { asset_id: String, reason: String },

    #[error("Fetch for {asset_id} timed out after {seconds}s")]
    FetchTimeout { asset_id: String, seconds: u64 },

    #[error("Source unavailable for {asset_id}: {reason}")]
    FetchUnavailable { asset_id: String, reason: String },

    #[error("No data for {asset_id} in the requested period")]
    NoData { asset_id: String },

    #[error("Insufficient data for {asset_id}: {points} point(s) in window")]
    InsufficientData { asset_id: String, points: usize },

    #[error("Zero baseline price for {asset_id}")]
    DegenerateBaseline { asset_id: String },

    #[error("Unknown asset: {asset_id}")]
    UnknownAsset { asset_id: String },

    #[error("Asset {asset_id} is not in category {category}")]
    CategoryMismatch { asset_id: String, category: String },

    #[error("Storage error for {asset_id}: {reason}")]
    Storage { asset_id: String, reason: String },
}

impl AssetError {
    pub fn storage(asset_id: &str, err: impl std::fmt::Display) -> Self {
        AssetError::Storage {
            asset_id: asset_id.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn malformed(asset_id: &str, reason: impl Into<String>) -> Self {
        AssetError::MalformedPayload {
            asset_id: asset_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(asset_id: &str, reason: impl Into<String>) -> Self {
        AssetError::FetchUnavailable {
            asset_id: asset_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Caller errors, rejected before the store is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}
