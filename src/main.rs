#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use graphwatch::backend::PrometheusBackend;
use graphwatch::config;
use graphwatch::http::server::run_http_server;
use graphwatch::http::state::HttpServerState;
use graphwatch::poller;
use graphwatch::store::DashboardStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing::event;

/// Monitoring backend for a distributed graph-database cluster.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path of the settings file.
    #[arg(long, default_value = "settings.toml")]
    settings: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing subscriber for HTTP request logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    config::load_configuration_from(&args.settings).context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    // Initialize Sentry if DSN is provided
    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                debug: true,
                ..Default::default()
            },
        ))
    });

    // Connect to the metrics backend
    let prometheus_url = config
        .parse_prometheus_url()
        .context("Invalid metrics backend URL")?;
    println!("📊 Using metrics backend: {}", prometheus_url);
    let backend = PrometheusBackend::new(
        prometheus_url,
        Duration::from_secs(config.query_timeout_seconds),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create metrics backend: {e}"))?;

    let store = Arc::new(DashboardStore::new(
        Arc::new(backend),
        config.cluster_id.clone(),
    ));

    // Exit the program if a panic occurs
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));

    // Background refresh of the watched series
    poller::spawn(store.clone());

    let address = SocketAddr::from((config.endpoint, config.port));

    println!("📡 Starting HTTP server on {}...", address);
    match run_http_server(
        HttpServerState {
            name: Arc::new("graphwatch".to_string()),
            store,
        },
        address,
    )
    .await
    {
        Ok(_) => {
            event!(Level::INFO, "HTTP server stopped gracefully");
            println!("✅ HTTP server stopped gracefully");
            Ok(())
        }
        Err(err) => {
            event!(Level::ERROR, "HTTP server failed to start: {}", err);
            Err(err)
        }
    }
}
