//! Weather & travel API
//!
//! - GET /weather/monthly-profile?city=..&month=..
//! - GET /travel/best-month?city=..&min_temp=..&max_temp=..
//! - GET /travel/compare-cities?cities=..&month=..
//! - GET /metrics

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weather_travel_api::{config, server, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 1. Load config ───────────────────────────────────────────
    let (cfg, source) = config::load().expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");
    tracing::info!(%source, upstream = %cfg.upstream.base_url, cities = cfg.cities.len(), "config loaded");

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState::new(cfg).expect("failed to build upstream HTTP client"));

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind listen address");

    tracing::info!(%listen, "weather-travel-api listening");

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
