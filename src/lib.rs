pub mod cli;
pub mod core;
pub mod import;
pub mod ingest;
pub mod normalize;
pub mod providers;
pub mod store;

use crate::core::asset::Catalog;
use crate::core::config::AppConfig;
use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Ingest {
        as_of: Option<NaiveDate>,
    },
    Query {
        category: String,
        period: String,
        assets: Vec<String>,
        as_of: Option<NaiveDate>,
        series: bool,
    },
    Assets,
    Import {
        asset_id: String,
        file: PathBuf,
    },
}

/// Prices are collected for the previous, completed day.
pub fn default_ingestion_date() -> NaiveDate {
    let today = Local::now().date_naive();
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let catalog = Catalog::builtin();
    let store = store::open_store(&config)?;

    match command {
        AppCommand::Ingest { as_of } => {
            let fetcher = providers::HttpSourceFetcher::new(&config.providers)?;
            let as_of = as_of.unwrap_or_else(default_ingestion_date);
            cli::ingest::run(&catalog, &fetcher, &store, (&config).into(), as_of).await;
            store.persist()?;
        }
        AppCommand::Query {
            category,
            period,
            assets,
            as_of,
            series,
        } => {
            let args = cli::query::QueryArgs {
                category,
                assets,
                period,
                as_of: as_of.unwrap_or_else(|| Local::now().date_naive()),
                series,
            };
            cli::query::run(&catalog, &store, args)?;
        }
        AppCommand::Assets => cli::assets::run(&catalog, &store)?,
        AppCommand::Import { asset_id, file } => {
            cli::import::run(&catalog, &store, &asset_id, &file)?;
            store.persist()?;
        }
    }
    Ok(())
}
