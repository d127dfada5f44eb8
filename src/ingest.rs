//! The daily collection cycle: fetch, normalize, store, then prune.

use crate::core::asset::{AssetDescriptor, Catalog};
use crate::core::config::AppConfig;
use crate::core::error::AssetError;
use crate::core::retention::{PruneReport, prune_all};
use crate::core::series::TimeSeriesStore;
use crate::core::source::SourceFetcher;
use crate::normalize;
use chrono::NaiveDate;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestionSettings {
    pub retention_years: u32,
    pub fetch_timeout: Duration,
}

impl From<&AppConfig> for IngestionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            retention_years: config.retention_years,
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    Stored { written: usize },
    Skipped(AssetError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub as_of: NaiveDate,
    pub outcomes: Vec<(String, AssetOutcome)>,
    pub prune: PruneReport,
}

impl IngestionReport {
    pub fn outcome(&self, asset_id: &str) -> Option<&AssetOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == asset_id)
            .map(|(_, o)| o)
    }

    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                AssetOutcome::Stored { written } => *written,
                AssetOutcome::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &AssetError)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            AssetOutcome::Skipped(e) => Some((id.as_str(), e)),
            AssetOutcome::Stored { .. } => None,
        })
    }
}

async fn ingest_asset(
    asset: &AssetDescriptor,
    fetcher: &dyn SourceFetcher,
    store: &dyn TimeSeriesStore,
    fetch_timeout: Duration,
    as_of: NaiveDate,
) -> Result<usize, AssetError> {
    let payload = tokio::time::timeout(fetch_timeout, fetcher.fetch_raw(asset, as_of))
        .await
        .map_err(|_| AssetError::FetchTimeout {
            asset_id: asset.asset_id.clone(),
            seconds: fetch_timeout.as_secs(),
        })??;

    let observations = normalize::normalize(asset, &payload)?;
    debug!(asset = %asset.asset_id, points = observations.len(), "Normalized payload");

    store
        .upsert(&asset.asset_id, &observations)
        .map_err(|e| AssetError::storage(&asset.asset_id, e))
}

/// Runs one collection cycle for every catalog asset as of `as_of`.
///
/// Fetches run concurrently and each asset fails on its own. Retention is
/// applied once every asset has been stored or skipped.
pub async fn run_ingestion(
    catalog: &Catalog,
    fetcher: &dyn SourceFetcher,
    store: &dyn TimeSeriesStore,
    settings: IngestionSettings,
    as_of: NaiveDate,
) -> IngestionReport {
    run_ingestion_with_progress(catalog, fetcher, store, settings, as_of, &|_, _| {}).await
}

/// Like [`run_ingestion`], calling `on_settled` as each asset is stored or
/// skipped, timeouts included.
pub async fn run_ingestion_with_progress(
    catalog: &Catalog,
    fetcher: &dyn SourceFetcher,
    store: &dyn TimeSeriesStore,
    settings: IngestionSettings,
    as_of: NaiveDate,
    on_settled: &(dyn Fn(&str, &AssetOutcome) + Sync),
) -> IngestionReport {
    info!(%as_of, assets = catalog.len(), "Starting ingestion");

    let tasks = catalog.iter().map(|asset| async move {
        let outcome =
            match ingest_asset(asset, fetcher, store, settings.fetch_timeout, as_of).await {
                Ok(written) => AssetOutcome::Stored { written },
                Err(e) => {
                    warn!(asset = %asset.asset_id, error = %e, "Skipping asset");
                    AssetOutcome::Skipped(e)
                }
            };
        on_settled(&asset.asset_id, &outcome);
        (asset.asset_id.clone(), outcome)
    });
    let outcomes = join_all(tasks).await;

    let prune = prune_all(catalog, store, settings.retention_years, as_of);

    let report = IngestionReport {
        as_of,
        outcomes,
        prune,
    };
    info!(
        written = report.written(),
        skipped = report.skipped().count(),
        pruned = report.prune.removed(),
        "Ingestion finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{Category, SourceBinding};
    use crate::core::observation::Observation;
    use crate::core::source::RawPayload;
    use crate::store::MemoryStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog(ids: &[&str]) -> Catalog {
        Catalog::new(
            ids.iter()
                .map(|id| AssetDescriptor::new(id, id, Category::Crypto, SourceBinding::FlatList))
                .collect(),
        )
    }

    enum Reply {
        Body(Value),
        Fail,
        Hang,
    }

    struct ScriptedFetcher {
        replies: HashMap<String, Reply>,
    }

    impl ScriptedFetcher {
        fn new(replies: Vec<(&str, Reply)>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|(id, r)| (id.to_string(), r))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl SourceFetcher for ScriptedFetcher {
        async fn fetch_raw(
            &self,
            asset: &AssetDescriptor,
            as_of: NaiveDate,
        ) -> Result<RawPayload, AssetError> {
            match self.replies.get(&asset.asset_id) {
                Some(Reply::Body(body)) => Ok(RawPayload::new(body.clone(), as_of)),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(AssetError::unavailable(&asset.asset_id, "unreachable"))
                }
                Some(Reply::Fail) | None => {
                    Err(AssetError::unavailable(&asset.asset_id, "HTTP 503"))
                }
            }
        }
    }

    fn settings(timeout_ms: u64) -> IngestionSettings {
        IngestionSettings {
            retention_years: 5,
            fetch_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_asset() {
        let catalog = catalog(&["A", "B", "C", "D"]);
        let fetcher = ScriptedFetcher::new(vec![
            ("A", Reply::Body(json!([["2024-01-01", 1.0], ["2024-01-02", 2.0]]))),
            ("B", Reply::Hang),
            ("C", Reply::Body(json!("not a list"))),
            ("D", Reply::Fail),
        ]);
        let store = MemoryStore::new();

        let report = run_ingestion(&catalog, &fetcher, &store, settings(50), day(2024, 1, 2)).await;

        assert_eq!(report.outcome("A"), Some(&AssetOutcome::Stored { written: 2 }));
        assert_eq!(
            report.outcome("B"),
            Some(&AssetOutcome::Skipped(AssetError::FetchTimeout {
                asset_id: "B".to_string(),
                seconds: 0,
            }))
        );
        assert!(matches!(
            report.outcome("C"),
            Some(AssetOutcome::Skipped(AssetError::MalformedPayload { .. }))
        ));
        assert!(matches!(
            report.outcome("D"),
            Some(AssetOutcome::Skipped(AssetError::FetchUnavailable { .. }))
        ));
        assert_eq!(report.written(), 2);
        assert_eq!(report.skipped().count(), 3);

        let stored = store
            .range_query("A", day(2024, 1, 1), day(2024, 1, 2))
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(store.earliest("B").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_cycle_is_idempotent() {
        let catalog = catalog(&["A"]);
        let fetcher = ScriptedFetcher::new(vec![(
            "A",
            Reply::Body(json!([["2024-01-01", 1.0], ["2024-01-02", 2.0]])),
        )]);
        let store = MemoryStore::new();

        run_ingestion(&catalog, &fetcher, &store, settings(1000), day(2024, 1, 2)).await;
        run_ingestion(&catalog, &fetcher, &store, settings(1000), day(2024, 1, 2)).await;

        let stored = store
            .range_query("A", day(2023, 1, 1), day(2024, 12, 31))
            .unwrap();
        assert_eq!(
            stored,
            vec![
                Observation::new(day(2024, 1, 1), 1.0).unwrap(),
                Observation::new(day(2024, 1, 2), 2.0).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_progress_counts_timed_out_assets() {
        let catalog = catalog(&["A", "B", "C"]);
        let fetcher = ScriptedFetcher::new(vec![
            ("A", Reply::Body(json!([["2024-01-01", 1.0]]))),
            ("B", Reply::Hang),
            ("C", Reply::Hang),
        ]);
        let store = MemoryStore::new();
        let settled = AtomicUsize::new(0);
        let timed_out = Mutex::new(Vec::new());

        run_ingestion_with_progress(
            &catalog,
            &fetcher,
            &store,
            settings(20),
            day(2024, 1, 2),
            &|asset_id, outcome| {
                settled.fetch_add(1, Ordering::SeqCst);
                if matches!(outcome, AssetOutcome::Skipped(AssetError::FetchTimeout { .. })) {
                    timed_out.lock().unwrap().push(asset_id.to_string());
                }
            },
        )
        .await;

        assert_eq!(settled.load(Ordering::SeqCst), catalog.len());
        let mut timed_out = timed_out.into_inner().unwrap();
        timed_out.sort();
        assert_eq!(timed_out, vec!["B", "C"]);
    }

    /// Records the order of writes and deletes reaching the store.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<String>>,
    }

    impl TimeSeriesStore for RecordingStore {
        fn upsert(&self, asset_id: &str, observations: &[Observation]) -> Result<usize> {
            self.calls.lock().unwrap().push(format!("upsert:{asset_id}"));
            self.inner.upsert(asset_id, observations)
        }

        fn range_query(
            &self,
            asset_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Observation>> {
            self.inner.range_query(asset_id, start, end)
        }

        fn earliest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
            self.inner.earliest(asset_id)
        }

        fn latest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
            self.inner.latest(asset_id)
        }

        fn delete_before(&self, asset_id: &str, cutoff: NaiveDate) -> Result<usize> {
            self.calls.lock().unwrap().push(format!("prune:{asset_id}"));
            self.inner.delete_before(asset_id, cutoff)
        }
    }

    #[tokio::test]
    async fn test_prune_runs_after_every_upsert() {
        let catalog = catalog(&["A", "B"]);
        let fetcher = ScriptedFetcher::new(vec![
            ("A", Reply::Body(json!([["2017-06-01", 5.0], ["2024-01-01", 6.0]]))),
            ("B", Reply::Body(json!([["2024-01-01", 7.0]]))),
        ]);
        let store = RecordingStore::default();

        let report = run_ingestion(&catalog, &fetcher, &store, settings(1000), day(2024, 1, 2)).await;

        let calls = store.calls.lock().unwrap().clone();
        let last_upsert = calls.iter().rposition(|c| c.starts_with("upsert:")).unwrap();
        let first_prune = calls.iter().position(|c| c.starts_with("prune:")).unwrap();
        assert!(last_upsert < first_prune, "calls: {calls:?}");

        assert_eq!(report.prune.cutoff, day(2019, 1, 2));
        assert_eq!(report.prune.removed(), 1);
        assert_eq!(store.earliest("A").unwrap(), Some(day(2024, 1, 1)));
    }

    #[test]
    fn test_settings_follow_config() {
        let config = AppConfig {
            retention_years: 2,
            fetch_timeout_secs: 7,
            ..AppConfig::default()
        };
        assert_eq!(
            IngestionSettings::from(&config),
            IngestionSettings {
                retention_years: 2,
                fetch_timeout: Duration::from_secs(7),
            }
        );
    }
}
