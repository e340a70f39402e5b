//! GNSS Monitor - always-on spoof detection for the ground-station dashboard

use anyhow::{Context, Result};
use axum::routing::get;
use clap::Parser;
use gnss_feed::{FeedClient, SampleSelection};
use gnss_monitor::{api, loops, Config, MonitorState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Poll a GNSS PVT feed and flag spoofed fixes (flags override environment)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// API port
    #[arg(long)]
    port: Option<u16>,

    /// Feed base URL
    #[arg(long)]
    feed_url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Sample selection for array payloads (random | latest)
    #[arg(long)]
    selection: Option<SampleSelection>,

    /// Log a readout line for every accepted sample
    #[arg(long)]
    console: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(url) = self.feed_url {
            config.feed_base_url = url;
        }
        if let Some(ms) = self.poll_interval_ms.filter(|ms| *ms > 0) {
            config.poll_interval_ms = ms;
        }
        if let Some(selection) = self.selection {
            config.sample_selection = selection;
        }
        config.console |= self.console;
    }
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("gnss_monitor=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::from_env();
    Args::parse().apply(&mut config);
    init_tracing(&config)?;

    tracing::info!("Starting GNSS Monitor...");

    let client = FeedClient::with_base_url(
        &config.feed_base_url,
        &config.feed_paths,
        config.request_timeout(),
        config.sample_selection,
    )
    .context("failed to create feed client")?;
    let state = Arc::new(MonitorState::new(config.detector_rules()));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start background loops
    let poller = tokio::spawn(loops::gnss_poll_loop::run_gnss_poll_loop(
        state.clone(),
        client,
        config.poll_interval(),
        config.console,
        shutdown_tx.subscribe(),
    ));

    let app = api::routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Shutdown requested");
    let _ = shutdown_tx.send(());
    let _ = poller.await;

    Ok(())
}
