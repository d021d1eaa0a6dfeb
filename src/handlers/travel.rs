use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::sync::Arc;

use crate::aggregate::{mean_of_present, round2};
use crate::config::{Config, Location};
use crate::metrics::Route;
use crate::AppState;

use super::{validate_month, AppError};

/// Placeholder answer: no real best-month search exists yet.
const BEST_MONTH: u32 = 6;
const IDEAL_MIN_TEMP: f64 = 15.0;
const IDEAL_MAX_TEMP: f64 = 25.0;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BestMonthParams {
    pub city: String,
    pub min_temp: f64,
    pub max_temp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestMonth {
    pub city: String,
    pub best_month: u32,
    pub min_temp_diff: f64,
    pub max_temp_diff: f64,
    pub overall_diff: f64,
}

#[derive(Debug, Deserialize)]
pub struct CompareCitiesParams {
    /// Comma-separated city names.
    pub cities: String,
    pub month: i64,
}

/// Averages for one city; unavailable values are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityAverages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp_avg: Option<f64>,
}

/// `{"month": m, "<city>": {...}, ...}` with cities in request order.
#[derive(Debug, Clone)]
pub struct CityComparison {
    pub month: u32,
    pub cities: Vec<(String, CityAverages)>,
}

impl Serialize for CityComparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cities.len() + 1))?;
        map.serialize_entry("month", &self.month)?;
        for (name, averages) in &self.cities {
            map.serialize_entry(name, averages)?;
        }
        map.end()
    }
}

// ─── GET /travel/best-month ──────────────────────────────────────

pub async fn best_month(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BestMonthParams>, QueryRejection>,
) -> Result<Json<BestMonth>, AppError> {
    state
        .metrics
        .observe(Route::BestMonth, async {
            let Query(params) = query?;
            Ok::<_, AppError>(Json(score_best_month(params)?))
        })
        .await
}

fn score_best_month(params: BestMonthParams) -> Result<BestMonth, AppError> {
    if !params.min_temp.is_finite() || !params.max_temp.is_finite() {
        return Err(AppError::BadRequest(
            "min_temp and max_temp must be finite numbers".into(),
        ));
    }

    let min_temp_diff = (params.min_temp - IDEAL_MIN_TEMP).abs();
    let max_temp_diff = (params.max_temp - IDEAL_MAX_TEMP).abs();

    Ok(BestMonth {
        city: params.city,
        best_month: BEST_MONTH,
        min_temp_diff: round2(min_temp_diff),
        max_temp_diff: round2(max_temp_diff),
        overall_diff: round2(min_temp_diff + max_temp_diff),
    })
}

// ─── GET /travel/compare-cities ──────────────────────────────────

pub async fn compare_cities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CompareCitiesParams>, QueryRejection>,
) -> Result<Json<CityComparison>, AppError> {
    state
        .metrics
        .observe(Route::CompareCities, async {
            let Query(params) = query?;
            let month = validate_month(params.month)?;

            // Resolve every name before the first upstream call so an
            // unknown city fails the request without fetching anything.
            let targets = resolve_cities(&state.config, &params.cities)?;

            let mut cities = Vec::with_capacity(targets.len());
            for location in targets {
                let daily = state
                    .weather
                    .monthly_temperatures(location.coordinates(), month)
                    .await
                    .map_err(AppError::comparing)?;
                cities.push((
                    location.name.clone(),
                    CityAverages {
                        min_temp_avg: mean_of_present(&daily.temperature_2m_min),
                        max_temp_avg: mean_of_present(&daily.temperature_2m_max),
                    },
                ));
            }

            Ok::<_, AppError>(Json(CityComparison { month, cities }))
        })
        .await
}

/// Split `raw` on commas and look each name up in the city table.
/// Repeated names are kept once, at their first position.
fn resolve_cities<'a>(config: &'a Config, raw: &str) -> Result<Vec<&'a Location>, AppError> {
    let mut resolved: Vec<&Location> = Vec::new();
    for name in raw.split(',').map(str::trim) {
        let location = config
            .city(name)
            .ok_or_else(|| AppError::UnknownCity(name.to_string()))?;
        if !resolved.iter().any(|l| l.name == location.name) {
            resolved.push(location);
        }
    }
    Ok(resolved)
}
