use crate::config::Config;
use crate::store::Store;
use clap::Parser;
use eyre::WrapErr;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{Level, error};

mod commands;
mod config;
mod display;
mod model;
mod store;
mod tracker;

const DEFAULT_CONFIG: &str = "tracker.toml";

#[derive(Parser)]
#[command(version, author, about)]
struct Args {
    #[arg(short, long, help = "Use FILE instead of tracker.toml")]
    config: Option<PathBuf>,
    #[arg(short, long, value_name = "URL", help = "Database connection string")]
    database: Option<String>,
    #[arg(short, action = clap::ArgAction::Count, help = "Set verbosity level")]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);
    let config = match &args.config {
        Some(file_name) => Config::load(file_name)?,
        None => Config::load_if_exists(DEFAULT_CONFIG.as_ref())?,
    };
    let url = config.database_url(args.database.as_deref());
    let mut store = Store::connect(&url)
        .await
        .wrap_err_with(|| format!("cannot connect to database {url}"))?;
    let result = tracker::run(
        &mut store,
        BufReader::new(tokio::io::stdin()),
        &mut std::io::stdout(),
    )
    .await;
    keep_first_error(result, store.close().await)
}

/// An error from the session wins over one from closing the connection,
/// which is only logged in that case.
fn keep_first_error(result: eyre::Result<()>, closed: eyre::Result<()>) -> eyre::Result<()> {
    match (result, closed) {
        (Err(e), Err(close_error)) => {
            error!("{close_error:#}");
            Err(e)
        }
        (result, closed) => result.and(closed),
    }
}
