//! pdf-highlight
//!
//! Locates search items in a PDF and prints the highlight result as JSON.
//!
//! ```text
//! pdf-highlight contract.pdf '[{"id":"1","type":"pii","text":"090-1234-5678"}]'
//! cat items.json | pdf-highlight contract.pdf
//! ```
//!
//! Logs go to stderr so stdout carries only the JSON document. Malformed
//! item JSON exits with status 1; an unreadable PDF still prints a result
//! with its `error` field set.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use shared_types::{parse_search_items, LocatorResult, SearchItem};
use text_locator::{DocumentSource, Locator, LocatorConfig, LopdfBackend};
use tracing::{debug, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::FileConfig;

/// Command-line arguments for pdf-highlight
#[derive(Parser, Debug)]
#[command(name = "pdf-highlight")]
#[command(version, about = "Locate search items in a PDF as normalized highlight rectangles")]
struct Args {
    /// PDF to search
    pdf_path: PathBuf,

    /// JSON array of search items; read from stdin when omitted
    search_items_json: Option<String>,

    /// TOML config file with a [locator] section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only use exact search, skip the normalized span fallback
    #[arg(long)]
    no_fallback: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    let config = file_config.locator_config(args.no_fallback);

    let raw = match &args.search_items_json {
        Some(json) => json.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read search items from stdin")?;
            buf
        }
    };
    let items = parse_search_items(&raw)?;
    debug!("{} search items, fallback={}", items.len(), config.enable_fallback);

    let result = locate(&args.pdf_path, &items, config);
    Ok(serde_json::to_string_pretty(&result)?)
}

fn locate(pdf_path: &Path, items: &[SearchItem], config: LocatorConfig) -> LocatorResult {
    Locator::with_config(LopdfBackend::new(), config).locate(&DocumentSource::path(pdf_path), items)
}
