use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use finboard::cli::setup::setup;
use finboard::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for finboard::AppCommand {
    fn from(cmd: Commands) -> finboard::AppCommand {
        match cmd {
            Commands::Ingest { as_of } => finboard::AppCommand::Ingest { as_of },
            Commands::Query {
                category,
                period,
                assets,
                as_of,
                series,
            } => finboard::AppCommand::Query {
                category,
                period,
                assets,
                as_of,
                series,
            },
            Commands::Assets => finboard::AppCommand::Assets,
            Commands::Import { asset_id, file } => finboard::AppCommand::Import { asset_id, file },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch, store and prune prices for every tracked asset
    Ingest {
        /// Day the prices are attributed to (defaults to yesterday)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Compare assets over a period
    Query {
        /// Currency, IndexFund, RareMaterial, Crypto or All
        category: String,
        /// 1W, 1M, 3M, 6M, 1Y, 3Y or 5Y
        #[arg(short, long, default_value = "1Y")]
        period: String,
        /// Restrict to these asset IDs
        #[arg(short, long, value_delimiter = ',')]
        assets: Vec<String>,
        /// Last day of the window (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Also print the scaled change series
        #[arg(short, long)]
        series: bool,
    },
    /// List tracked assets and their stored history
    Assets,
    /// Load a CSV or JSON price history for one asset
    Import {
        asset_id: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => finboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
