use axum::{middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::metrics::endpoint;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Weather endpoints ───────────────────────────────────
        .route(
            "/weather/monthly-profile",
            get(handlers::weather::monthly_profile),
        )
        // ── Travel endpoints ────────────────────────────────────
        .route("/travel/best-month", get(handlers::travel::best_month))
        .route(
            "/travel/compare-cities",
            get(handlers::travel::compare_cities),
        )
        // ── Metrics ─────────────────────────────────────────────
        .route("/metrics", get(endpoint::get_metrics))
        .route("/health", get(handlers::health))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
