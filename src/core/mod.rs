//! Domain types and the pure computations over them.

pub mod asset;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod log;
pub mod metrics;
pub mod observation;
pub mod period;
pub mod retention;
pub mod series;
pub mod source;

pub use asset::{AssetDescriptor, Catalog, Category, SourceBinding};
pub use compare::{ComparisonResult, Selection};
pub use error::{AssetError, QueryError};
pub use metrics::{MetricsResult, ScaledPoint};
pub use observation::Observation;
pub use period::{Period, PeriodToken};
pub use retention::{PruneReport, prune_all};
pub use series::TimeSeriesStore;
pub use source::{RawPayload, SourceFetcher};
