use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;

use crate::config::{Coordinates, UpstreamSection, WindowSection};

/// Daily fields requested from the archive API.
const DAILY_FIELDS: &str = "temperature_2m_min,temperature_2m_max";

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect/timeout failures and non-2xx statuses.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The archive answered 2xx but the body is not the expected shape.
    #[error("{0}")]
    Malformed(String),
    #[error("no archive window for month {0}")]
    Window(u32),
}

/// Daily min/max series as returned by the archive; any day may be `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemperatures {
    #[serde(default)]
    pub time: Vec<String>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub temperature_2m_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: DailyTemperatures,
}

/// Async client for the Open-Meteo historical archive.
///
/// Cheap to clone: every clone shares the same `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    archive_url: String,
    timezone: String,
    window: WindowSection,
}

impl WeatherClient {
    pub fn new(upstream: &UpstreamSection, window: &WindowSection) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(upstream.timeout())
            .build()?;

        Ok(Self {
            http,
            archive_url: format!("{}/v1/archive", upstream.base_url.trim_end_matches('/')),
            timezone: upstream.timezone.clone(),
            window: window.clone(),
        })
    }

    /// Fetch the daily min/max series for `month` (1..=12) over the configured window.
    pub async fn monthly_temperatures(
        &self,
        at: Coordinates,
        month: u32,
    ) -> Result<DailyTemperatures, UpstreamError> {
        let (start, end) = self.window.dates(month).ok_or(UpstreamError::Window(month))?;

        tracing::debug!(
            latitude = at.latitude,
            longitude = at.longitude,
            %start,
            %end,
            "fetching archive series"
        );

        let t0 = Instant::now();
        let result = self.fetch(at, &start.to_string(), &end.to_string()).await;
        let ms = t0.elapsed().as_millis() as u64;

        match &result {
            Ok(daily) => tracing::debug!(days = daily.time.len(), ms, "archive responded"),
            Err(e) => tracing::warn!(error = %e, ms, "archive request failed"),
        }
        result
    }

    async fn fetch(
        &self,
        at: Coordinates,
        start_date: &str,
        end_date: &str,
    ) -> Result<DailyTemperatures, UpstreamError> {
        let body = self
            .http
            .get(&self.archive_url)
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", self.timezone.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let parsed: ArchiveResponse =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        Ok(parsed.daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> WeatherClient {
        let upstream = UpstreamSection {
            base_url: server.uri(),
            timeout_ms: 2_000,
            timezone: "Europe/London".into(),
        };
        WeatherClient::new(&upstream, &WindowSection::default()).unwrap()
    }

    const TOKYO: Coordinates = Coordinates {
        latitude: 35.6762,
        longitude: 139.6503,
    };

    #[tokio::test]
    async fn sends_the_archive_query_and_keeps_null_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("latitude", "35.6762"))
            .and(query_param("longitude", "139.6503"))
            .and(query_param("start_date", "2018-07-01"))
            .and(query_param("end_date", "2023-07-28"))
            .and(query_param("daily", "temperature_2m_min,temperature_2m_max"))
            .and(query_param("timezone", "Europe/London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2018-07-01", "2018-07-02", "2018-07-03"],
                    "temperature_2m_min": [22.5, null, 23.5],
                    "temperature_2m_max": [30.0, 31.0, null]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let daily = client_for(&server).monthly_temperatures(TOKYO, 7).await.unwrap();
        assert_eq!(daily.time.len(), 3);
        assert_eq!(daily.temperature_2m_min, vec![Some(22.5), None, Some(23.5)]);
        assert_eq!(daily.temperature_2m_max, vec![Some(30.0), Some(31.0), None]);
    }

    #[tokio::test]
    async fn non_2xx_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).monthly_temperatures(TOKYO, 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_daily_block_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": true })))
            .mount(&server)
            .await;

        let err = client_for(&server).monthly_temperatures(TOKYO, 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)), "{err:?}");
        assert!(err.to_string().contains("daily"));
    }

    #[tokio::test]
    async fn slow_upstream_hits_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(1_500))
                    .set_body_json(json!({})),
            )
            .mount(&server)
            .await;

        let upstream = UpstreamSection {
            base_url: server.uri(),
            timeout_ms: 200,
            timezone: "Europe/London".into(),
        };
        let client = WeatherClient::new(&upstream, &WindowSection::default()).unwrap();
        let err = client.monthly_temperatures(TOKYO, 1).await.unwrap_err();
        match err {
            UpstreamError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn month_outside_the_calendar_has_no_window() {
        let server = MockServer::start().await;
        let err = client_for(&server).monthly_temperatures(TOKYO, 13).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Window(13)));
    }
}
