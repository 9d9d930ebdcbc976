use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cache;
mod config;
mod error;
mod handlers;
mod history;
mod metrics;
mod models;
mod rate_limit;
mod remote;
mod state;

use config::{Args, RemoteStoreConfig};
use handlers::{analyze_handler, health_handler, history_handler, metrics_handler};
use history::HistoryStore;
use rate_limit::{LIMIT, RateLimiter, WINDOW_MS, now_ms};
use remote::RemoteStore;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Remote counter store only when both env values are present.
    let remote = RemoteStoreConfig::from_env()
        .map(|cfg| RemoteStore::new(cfg.url, cfg.token, LIMIT, WINDOW_MS));
    let strategy = if remote.is_some() { "remote" } else { "local" };

    let state = Arc::new(AppState {
        client: reqwest::Client::new(),
        backend_url: args.backend_url.clone(),
        rate_limiter: RateLimiter::new(remote),
        cache: DashMap::new(),
        ttl: Duration::from_secs(args.cache_ttl),
        history: HistoryStore::new(),
    });

    // Sweep expired limiter windows so the map does not grow forever.
    let sweep_state = Arc::clone(&state);
    let sweep_every = Duration::from_secs(args.sweep_interval);
    tokio::spawn(async move {
        let mut ticker = interval(sweep_every);
        loop {
            ticker.tick().await;
            sweep_state.rate_limiter.sweep_expired(now_ms());
        }
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/history", get(history_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!(port = args.port, backend = %args.backend_url, limiter = strategy, "gateway running");
    axum::serve(listener, app).await.unwrap();
}
