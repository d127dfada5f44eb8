//! Remote price sources.

pub mod http;
pub mod util;

pub use http::HttpSourceFetcher;
