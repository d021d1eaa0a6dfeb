use std::sync::Arc;

pub mod aggregate;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod upstream;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Validated configuration, fixed for the life of the process.
    pub config: config::Config,

    /// Per-route statistics — handlers record observations, `/metrics` reads snapshots.
    pub metrics: Arc<metrics::MetricsRegistry>,

    /// Archive client; clones share one connection pool.
    pub weather: upstream::WeatherClient,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Self, upstream::UpstreamError> {
        let weather = upstream::WeatherClient::new(&config.upstream, &config.window)?;
        Ok(Self {
            config,
            metrics: Arc::new(metrics::MetricsRegistry::new()),
            weather,
        })
    }
}
