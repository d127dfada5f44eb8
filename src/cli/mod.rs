pub mod assets;
pub mod import;
pub mod ingest;
pub mod query;
pub mod setup;
pub mod ui;
