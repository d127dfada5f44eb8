use crate::core::asset::{AssetDescriptor, SourceBinding};
use crate::core::cache::Cache;
use crate::core::config::ProvidersConfig;
use crate::core::error::AssetError;
use crate::core::source::{RawPayload, SourceFetcher};
use crate::providers::util::with_retry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";
pub const EXCHANGE_RATE_KEY_ENV: &str = "EXCHANGE_RATE_API_KEY";

/// Fields Alpha Vantage uses in place of data when throttling or rejecting.
const NOTICE_FIELDS: [&str; 3] = ["Note", "Information", "Error Message"];

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: Option<String>,
}

fn resolve_key(configured: Option<&String>, env_var: &str) -> Option<String> {
    configured
        .cloned()
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

/// Fetches provider payloads over HTTP.
///
/// Responses are memoized per URL for the fetcher's lifetime, so assets
/// sharing a source (the exchange-rate pairs) trigger a single request.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
    alphavantage: Option<Endpoint>,
    exchange_rate: Option<Endpoint>,
    gold_api: Option<String>,
    responses: Cache<String, Arc<OnceCell<Value>>>,
}

impl HttpSourceFetcher {
    pub fn new(providers: &ProvidersConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("finboard/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            alphavantage: providers.alphavantage.as_ref().map(|p| Endpoint {
                base_url: p.base_url.trim_end_matches('/').to_string(),
                api_key: resolve_key(p.api_key.as_ref(), ALPHA_VANTAGE_KEY_ENV),
            }),
            exchange_rate: providers.exchange_rate.as_ref().map(|p| Endpoint {
                base_url: p.base_url.trim_end_matches('/').to_string(),
                api_key: resolve_key(p.api_key.as_ref(), EXCHANGE_RATE_KEY_ENV),
            }),
            gold_api: providers
                .gold_api
                .as_ref()
                .map(|p| p.base_url.trim_end_matches('/').to_string()),
            responses: Cache::new(),
        })
    }

    fn url_for(&self, asset: &AssetDescriptor) -> Result<String, AssetError> {
        let id = asset.asset_id.as_str();
        let keyed = |endpoint: &Option<Endpoint>, name: &str| -> Result<(String, String), AssetError> {
            let endpoint = endpoint
                .as_ref()
                .ok_or_else(|| AssetError::unavailable(id, format!("{name} is not configured")))?;
            let key = endpoint
                .api_key
                .clone()
                .ok_or_else(|| AssetError::unavailable(id, format!("no {name} API key")))?;
            Ok((endpoint.base_url.clone(), key))
        };

        match &asset.source_binding {
            SourceBinding::AlphaVantageDaily { symbol, .. } => {
                let (base, key) = keyed(&self.alphavantage, "Alpha Vantage")?;
                Ok(format!(
                    "{base}/query?function=TIME_SERIES_DAILY&symbol={symbol}&apikey={key}"
                ))
            }
            SourceBinding::ExchangeRate { .. } => {
                let (base, key) = keyed(&self.exchange_rate, "ExchangeRate-API")?;
                Ok(format!("{base}/v6/{key}/latest/USD"))
            }
            SourceBinding::SpotPrice { symbol } => {
                let base = self
                    .gold_api
                    .as_ref()
                    .ok_or_else(|| AssetError::unavailable(id, "gold-api is not configured"))?;
                Ok(format!("{base}/price/{symbol}"))
            }
            SourceBinding::FlatList => Err(AssetError::unavailable(id, "no remote source")),
        }
    }

    async fn request(&self, asset_id: &str, url: &str) -> Result<Value, AssetError> {
        let response = with_retry(|| async { self.client.get(url).send().await }, 3, 500)
            .await
            .map_err(|e| AssetError::unavailable(asset_id, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::unavailable(asset_id, format!("HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AssetError::unavailable(asset_id, format!("failed to read body: {e}")))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| AssetError::malformed(asset_id, format!("invalid JSON: {e}")))?;

        if let Some(notice) = NOTICE_FIELDS
            .iter()
            .find_map(|field| body.get(field).and_then(|v| v.as_str()))
        {
            return Err(AssetError::unavailable(asset_id, notice));
        }
        Ok(body)
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    #[instrument(
        name = "SourceFetch",
        skip(self, asset),
        fields(asset = %asset.asset_id)
    )]
    async fn fetch_raw(
        &self,
        asset: &AssetDescriptor,
        as_of: NaiveDate,
    ) -> Result<RawPayload, AssetError> {
        let url = self.url_for(asset)?;
        let cell = self
            .responses
            .get_or_insert_with(url.clone(), || Arc::new(OnceCell::new()))
            .await;

        let body = cell
            .get_or_try_init(|| async {
                debug!("Requesting {}", url);
                self.request(&asset.asset_id, &url).await
            })
            .await?;

        Ok(RawPayload::new(body.clone(), as_of))
    }
}
