//! CLI entry point for the bookinfo tool.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bookinfo_core::{
    BookRecord, BookService, Config, Crawler, Database, HttpFetcher, SqliteBookStore,
};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match &args.command {
        Command::Crawl { isbn } => {
            let crawler = build_crawler(&config)?;
            let record = crawler.crawl(isbn).await?;
            print_json(&record)?;
        }
        Command::Get { isbn } => {
            let service = build_service(&config, args.db.clone()).await?;
            let record = service.get(isbn).await;
            service.store().database().clone().close().await;
            print_json(&record?)?;
        }
        Command::Put { file } => {
            let record = read_record(file.as_ref())?;
            let service = build_service(&config, args.db.clone()).await?;
            let ack = service.put(&record).await;
            service.store().database().clone().close().await;
            print_json(&ack?)?;
        }
    }

    Ok(())
}

fn build_crawler(config: &Config) -> Result<Crawler<HttpFetcher>> {
    let fetcher = HttpFetcher::with_timeouts(&config.http.headers, config.timeouts())?;
    Ok(Crawler::new(fetcher, config.endpoints()?))
}

async fn build_service(
    config: &Config,
    db_override: Option<PathBuf>,
) -> Result<BookService<SqliteBookStore, HttpFetcher>> {
    let db_path = db_override.unwrap_or_else(|| config.database.path.clone());
    info!(path = %db_path.display(), "Opening catalog database");
    let db = Database::new_with_options(&db_path, config.database_options())
        .await
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    Ok(BookService::new(
        SqliteBookStore::new(db),
        build_crawler(config)?,
    ))
}

fn read_record(file: Option<&PathBuf>) -> Result<BookRecord> {
    let raw = if let Some(path) = file {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    } else if io::stdin().is_terminal() {
        bail!("No record provided.\n  Suggestion: Pass a JSON file or pipe the record via stdin");
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    serde_json::from_str(&raw).context("record is not valid JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
