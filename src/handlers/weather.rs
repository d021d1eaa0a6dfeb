use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregate::mean_of_present;
use crate::metrics::Route;
use crate::AppState;

use super::{validate_month, AppError};

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MonthlyProfileParams {
    pub city: String,
    pub month: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyProfile {
    pub city: String,
    pub month: u32,
    /// `null` when the archive has no usable day.
    pub min_temp_avg: Option<f64>,
    pub max_temp_avg: Option<f64>,
}

// ─── GET /weather/monthly-profile ────────────────────────────────

pub async fn monthly_profile(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MonthlyProfileParams>, QueryRejection>,
) -> Result<Json<MonthlyProfile>, AppError> {
    state
        .metrics
        .observe(Route::MonthlyProfile, async {
            let Query(params) = query?;
            let month = validate_month(params.month)?;

            // Known cities use their own coordinates, anything else the default location
            let location = state
                .config
                .city(&params.city)
                .unwrap_or(&state.config.default_location);

            let daily = state
                .weather
                .monthly_temperatures(location.coordinates(), month)
                .await?;

            Ok::<_, AppError>(Json(MonthlyProfile {
                city: params.city,
                month,
                min_temp_avg: mean_of_present(&daily.temperature_2m_min),
                max_temp_avg: mean_of_present(&daily.temperature_2m_max),
            }))
        })
        .await
}
