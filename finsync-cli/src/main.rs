//! FinSync CLI — ingest and schema inspection commands.
//!
//! Commands:
//! - `ingest` — fetch data for tickers and write it into the database
//! - `tables` — list data types and their destination tables

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finsync_core::config::{parse_data_types, parse_tickers, StoreBackend};
use finsync_core::domain::DataType;
use finsync_core::provider::YahooProvider;
use finsync_core::store::{open_store, Store};
use finsync_core::{IngestConfig, LogProgress, Pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "finsync",
    about = "FinSync — ingest financial statements and stock metrics into a relational store"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch data for each ticker and data type and store new rows.
    Ingest {
        /// Comma-separated tickers (e.g., AAPL,MSFT).
        #[arg(long)]
        tickers: String,

        /// Comma-separated data types (e.g., annual_income,stock_metrics).
        #[arg(long)]
        data_types: String,

        /// Path to a TOML config file.
        #[arg(long, env = "FINSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// SQLite database file. Selects the SQLite backend, overriding
        /// config and the DB_* variables.
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// List data types and their destination tables.
    Tables {
        /// Also introspect each table in the database.
        #[arg(long, default_value_t = false)]
        check: bool,

        /// Path to a TOML config file.
        #[arg(long, env = "FINSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// SQLite database file. Selects the SQLite backend, overriding
        /// config and the DB_* variables.
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            tickers,
            data_types,
            config,
            database,
        } => run_ingest(&tickers, &data_types, config.as_deref(), database),
        Commands::Tables {
            check,
            config,
            database,
        } => run_tables(check, config.as_deref(), database),
    }
}

fn load_config(path: Option<&Path>, database: Option<PathBuf>) -> Result<IngestConfig> {
    let mut config = match path {
        Some(path) => IngestConfig::from_file(path)?,
        None => IngestConfig::default(),
    };
    config.apply_env()?;
    if let Some(database) = database {
        config.database.use_sqlite(database);
    }
    Ok(config)
}

fn connect(config: &IngestConfig) -> Result<Box<dyn Store>> {
    let db = &config.database;
    open_store(db).with_context(|| match db.backend {
        StoreBackend::Postgres => format!("connect to postgres {}:{}/{}", db.host, db.port, db.name),
        StoreBackend::Sqlite => format!("open database {}", db.path.display()),
    })
}

fn run_ingest(
    tickers: &str,
    data_types: &str,
    config_path: Option<&Path>,
    database: Option<PathBuf>,
) -> Result<()> {
    let tickers = parse_tickers(tickers)?;
    let data_types = parse_data_types(data_types)?;
    let config = load_config(config_path, database)?;

    // No unit runs without a store.
    let store = connect(&config)?;
    let provider = YahooProvider::new(&config.provider).context("build Yahoo provider")?;
    let progress = LogProgress;

    let summary = Pipeline::new(&provider, store.as_ref(), &progress).run(&tickers, &data_types);

    if !summary.all_succeeded() {
        for (ticker, kind, err) in &summary.failures {
            eprintln!("Error for {ticker} {kind}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_tables(check: bool, config_path: Option<&Path>, database: Option<PathBuf>) -> Result<()> {
    let store = if check {
        Some(connect(&load_config(config_path, database)?)?)
    } else {
        None
    };

    for kind in DataType::ALL {
        println!("{:<20} {}", kind.as_str(), kind.table_name());
        if let Some(store) = &store {
            let columns = store
                .columns_of(kind.table_name())
                .with_context(|| format!("introspect {}", kind.table_name()))?;
            if columns.is_empty() {
                println!("  missing");
            } else {
                println!("  {}", columns.join(", "));
            }
        }
    }

    Ok(())
}
