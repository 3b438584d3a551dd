//! Locator Server
//!
//! HTTP front end for the text locator. Clients upload a PDF (base64) with
//! a list of search items and get back normalized highlight rectangles.
//!
//! - `GET /health`
//! - `POST /api/highlight`
//!
//! Each request opens its own document on a blocking worker. Rate limiting
//! via tower-governor, CORS via tower-http.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use text_locator::LocatorConfig;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;

use api::{handle_health, handle_highlight};
use config::FileConfig;

/// Command-line arguments for the locator server
#[derive(Parser, Debug)]
#[command(name = "locator-server")]
#[command(about = "HTTP service locating search items in PDFs")]
struct Args {
    /// TOML config file with [server] and [locator] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Locate timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Rate limit: requests per second per IP
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Only use exact search, skip the normalized span fallback
    #[arg(long)]
    no_fallback: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Flags win over the file
    fn apply(&self, mut file: FileConfig) -> FileConfig {
        if let Some(port) = self.port {
            file.server.port = port;
        }
        if let Some(host) = &self.host {
            file.server.host = host.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            file.server.timeout_ms = timeout_ms;
        }
        if let Some(rate_limit) = self.rate_limit {
            file.server.rate_limit = rate_limit;
        }
        if self.no_fallback {
            file.locator.enable_fallback = false;
        }
        file
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Locate timeout in milliseconds
    pub timeout_ms: u64,
    pub locator: LocatorConfig,
}

/// Routes and request-shaping middleware, without rate limiting
/// Requests a client may send at once before the per-second rate applies
fn burst_size(rate_limit: u32) -> u32 {
    rate_limit.saturating_mul(2)
}

fn app(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/highlight", post(handle_highlight))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.apply(FileConfig::load(args.config.as_deref())?);
    let server = &config.server;

    info!("Starting locator server on {}:{}", server.host, server.port);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(server.rate_limit.into())
            .burst_size(burst_size(server.rate_limit))
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit {}", server.rate_limit))?,
    );

    let state = AppState {
        timeout_ms: server.timeout_ms,
        locator: config.locator.clone(),
    };

    let router = app(state, server.max_body_bytes).layer(GovernorLayer {
        config: governor_conf,
    });

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", server.rate_limit);
    info!("Locate timeout: {}ms", server.timeout_ms);
    info!("Fallback tier: {}", config.locator.enable_fallback);

    // The governor keys on the peer address
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
