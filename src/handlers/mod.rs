pub mod travel;
pub mod weather;

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::upstream::UpstreamError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Weather data for {0} is not available.")]
    UnknownCity(String),
    /// Network failure, timeout or non-2xx answer from the archive.
    #[error("Request error: {0}")]
    Upstream(String),
    /// The archive answered but the payload could not be used.
    #[error("Error processing weather data: {0}")]
    Processing(String),
    /// Same as `Processing`, reported by `/travel/compare-cities`.
    #[error("Error comparing cities: {0}")]
    Comparison(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnknownCity(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_)
            | Self::Processing(_)
            | Self::Comparison(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Archive failure seen while comparing cities; payload problems get
    /// the comparison wording, transport failures stay `Request error`.
    pub fn comparing(e: UpstreamError) -> Self {
        match Self::from(e) {
            Self::Processing(msg) => Self::Comparison(msg),
            other => other,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Transport(e) => Self::Upstream(e.to_string()),
            UpstreamError::Malformed(msg) => Self::Processing(msg),
            e @ UpstreamError::Window(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        } else {
            tracing::debug!(error = %message, "request rejected");
        }

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

// ─── Shared validation ───────────────────────────────────────────

/// Accept calendar months only.
pub(crate) fn validate_month(month: i64) -> Result<u32, AppError> {
    match u32::try_from(month) {
        Ok(m @ 1..=12) => Ok(m),
        _ => Err(AppError::BadRequest(
            "Invalid month. Must be between 1 and 12.".into(),
        )),
    }
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
