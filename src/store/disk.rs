use crate::core::observation::Observation;
use crate::core::series::TimeSeriesStore;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "observations";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// fjall backed store keeping every series in a single partition.
///
/// Keys are `asset_id 0x00 YYYY-MM-DD` so a prefix scan yields one asset's
/// series in date order. Values are the JSON encoded price.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open observations partition")?;
        debug!("Opened store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    /// Syncs the journal to disk.
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist store")
    }
}

fn series_prefix(asset_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(asset_id.len() + 1);
    prefix.extend_from_slice(asset_id.as_bytes());
    prefix.push(0);
    prefix
}

fn series_key(asset_id: &str, date: NaiveDate) -> Vec<u8> {
    let mut key = series_prefix(asset_id);
    key.extend_from_slice(date.format(DATE_FORMAT).to_string().as_bytes());
    key
}

fn decode_date(prefix_len: usize, key: &[u8]) -> Result<NaiveDate> {
    let raw = key
        .get(prefix_len..)
        .ok_or_else(|| anyhow!("Stored key shorter than its prefix"))?;
    let text = std::str::from_utf8(raw).context("Stored date is not UTF-8")?;
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .with_context(|| format!("Invalid stored date: {text}"))
}

impl TimeSeriesStore for DiskStore {
    fn upsert(&self, asset_id: &str, observations: &[Observation]) -> Result<usize> {
        let mut batch = self.keyspace.batch();
        for observation in observations {
            batch.insert(
                &self.partition,
                series_key(asset_id, observation.date),
                serde_json::to_vec(&observation.price)?,
            );
        }
        batch
            .commit()
            .with_context(|| format!("Failed to commit upsert for {asset_id}"))?;
        debug!("Disk UPSERT {} observation(s) for {}", observations.len(), asset_id);
        Ok(observations.len())
    }

    fn range_query(
        &self,
        asset_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        if start > end {
            return Ok(Vec::new());
        }
        let prefix_len = series_prefix(asset_id).len();
        let from = series_key(asset_id, start);
        let to = series_key(asset_id, end);

        let mut observations = Vec::new();
        for item in self.partition.range(from..=to) {
            let (key, value) = item?;
            let date = decode_date(prefix_len, &key)?;
            let price: f64 = serde_json::from_slice(&value)
                .with_context(|| format!("Invalid stored price for {asset_id} on {date}"))?;
            observations.push(Observation { date, price });
        }
        Ok(observations)
    }

    fn earliest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
        let prefix = series_prefix(asset_id);
        match self.partition.prefix(&prefix).next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(Some(decode_date(prefix.len(), &key)?))
            }
            None => Ok(None),
        }
    }

    fn latest(&self, asset_id: &str) -> Result<Option<NaiveDate>> {
        let prefix = series_prefix(asset_id);
        match self.partition.prefix(&prefix).next_back() {
            Some(item) => {
                let (key, _) = item?;
                Ok(Some(decode_date(prefix.len(), &key)?))
            }
            None => Ok(None),
        }
    }

    fn delete_before(&self, asset_id: &str, cutoff: NaiveDate) -> Result<usize> {
        let from = series_prefix(asset_id);
        let to = series_key(asset_id, cutoff);

        let mut batch = self.keyspace.batch();
        let mut removed = 0;
        for item in self.partition.range(from..to) {
            let (key, _) = item?;
            batch.remove(&self.partition, key);
            removed += 1;
        }
        batch
            .commit()
            .with_context(|| format!("Failed to commit delete for {asset_id}"))?;
        debug!("Disk DELETE {} observation(s) for {}", removed, asset_id);
        Ok(removed)
    }
}
