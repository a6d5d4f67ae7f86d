//! # Catalog Installer
//!
//! Loads a normalized product feed into the database.
//!
//! ## Usage
//! ```bash
//! # Load into the configured database (PURBEURRE_DB_PATH or ./purbeurre.db)
//! cargo run -p purbeurre-db --bin install -- --feed ./products.json
//!
//! # Start from empty tables
//! cargo run -p purbeurre-db --bin install -- --feed ./products.json --reset
//!
//! # Specify database path
//! cargo run -p purbeurre-db --bin install -- --feed ./products.json --db ./data/catalog.db
//! ```
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - One line per statement
//! - Default: `info,purbeurre=debug,sqlx=warn`

use std::env;
use std::process::ExitCode;

use purbeurre_db::install::{install_records, load_records};
use purbeurre_db::{Database, DbConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    feed: Option<String>,
    db_path: Option<String>,
    reset: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--feed" | "-f" => {
                i += 1;
                parsed.feed = Some(args.get(i).ok_or("--feed needs a file")?.clone());
            }
            "--db" | "-d" => {
                i += 1;
                parsed.db_path = Some(args.get(i).ok_or("--db needs a path")?.clone());
            }
            "--reset" => parsed.reset = true,
            "--help" | "-h" => parsed.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(parsed)
}

fn print_usage() {
    println!("Pur Beurre Catalog Installer");
    println!();
    println!("Usage: install --feed <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --feed <FILE>  JSON array of normalized product records");
    println!("  -d, --db <PATH>    Database file path (default: $PURBEURRE_DB_PATH or ./purbeurre.db)");
    println!("      --reset        Drop every table before loading");
    println!("  -h, --help         Show this help message");
}

/// Initializes the tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,purbeurre=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let raw: Vec<String> = env::args().collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let Some(feed) = args.feed else {
        eprintln!("--feed is required");
        print_usage();
        return ExitCode::FAILURE;
    };

    match run(&feed, args.db_path, args.reset).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Install failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    feed: &str,
    db_path: Option<String>,
    reset: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(feed)?;
    info!(feed = %feed, records = records.len(), "Feed loaded");

    let mut config = DbConfig::from_env().create_tables(false);
    if let Some(path) = db_path {
        config.database_path = path.into();
    }
    let db = Database::new(config).await?;

    if reset {
        info!("Dropping existing tables");
        db.drop_tables().await?;
    }
    db.create_tables().await?;

    let report = install_records(&db, &records).await?;

    println!("✓ Installed {} products", report.products);
    println!("  Categories: {} ({} links)", report.categories, report.category_links);
    println!("  Stores:     {} ({} links)", report.stores, report.store_links);

    db.close().await;
    Ok(())
}
