//! Service configuration (strict YAML, every field defaulted).

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WEATHER_API_CONFIG";
/// File looked up in the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "weather-api.yaml";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ─── Schema ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub window: WindowSection,

    /// Used by the monthly profile for cities missing from `cities`.
    #[serde(default = "default_location")]
    pub default_location: Location,

    /// Cities accepted by `/travel/compare-cities`.
    #[serde(default = "default_cities")]
    pub cities: Vec<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            upstream: UpstreamSection::default(),
            window: WindowSection::default(),
            default_location: default_location(),
            cities: default_cities(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            timezone: default_timezone(),
        }
    }
}

impl UpstreamSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Historical window queried for every month: `start_year-MM-01 ..= end_year-MM-end_day`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSection {
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Same day for every month, so 29–31 are never queried.
    #[serde(default = "default_end_day")]
    pub end_day: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            end_day: default_end_day(),
        }
    }
}

impl WindowSection {
    /// First and last day of the archive window for `month` (1..=12).
    pub fn dates(&self, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.start_year, month, 1)?;
        let end = NaiveDate::from_ymd_opt(self.end_year, month, self.end_day)?;
        Some((start, end))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// ─── Defaults ────────────────────────────────────────────────────

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_base_url() -> String {
    "https://archive-api.open-meteo.com".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_timezone() -> String {
    "Europe/London".into()
}
fn default_start_year() -> i32 {
    2018
}
fn default_end_year() -> i32 {
    2023
}
fn default_end_day() -> u32 {
    28
}
fn default_location() -> Location {
    Location::new("London", 51.5074, -0.1278)
}
fn default_cities() -> Vec<Location> {
    vec![
        Location::new("New York", 40.7128, -74.0060),
        Location::new("Tokyo", 35.6762, 139.6503),
        Location::new("Sydney", -33.8688, 151.2093),
    ]
}

// ─── Validation / lookup ─────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(100..=120_000).contains(&self.upstream.timeout_ms) {
            return Err(ConfigError::Invalid(
                "upstream.timeout_ms must be between 100 and 120000".into(),
            ));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("upstream.base_url must not be empty".into()));
        }
        if self.upstream.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid("upstream.timezone must not be empty".into()));
        }

        let w = &self.window;
        if !(1..=28).contains(&w.end_day) {
            return Err(ConfigError::Invalid("window.end_day must be between 1 and 28".into()));
        }
        if w.start_year > w.end_year {
            return Err(ConfigError::Invalid(
                "window.start_year must not be after window.end_year".into(),
            ));
        }
        if w.dates(1).is_none() {
            return Err(ConfigError::Invalid("window years are out of range".into()));
        }

        validate_location("default_location", &self.default_location)?;

        if self.cities.is_empty() {
            return Err(ConfigError::Invalid("cities must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for city in &self.cities {
            validate_location("cities", city)?;
            if !seen.insert(city.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "cities: duplicate name '{}'",
                    city.name
                )));
            }
        }

        Ok(())
    }

    /// Exact, case-sensitive lookup in the city table.
    pub fn city(&self, name: &str) -> Option<&Location> {
        self.cities.iter().find(|c| c.name == name)
    }
}

fn validate_location(field: &str, loc: &Location) -> Result<()> {
    if loc.name.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field}: name must not be empty")));
    }
    if !(-90.0..=90.0).contains(&loc.latitude) {
        return Err(ConfigError::Invalid(format!(
            "{field}: latitude of '{}' must be within -90..90",
            loc.name
        )));
    }
    if !(-180.0..=180.0).contains(&loc.longitude) {
        return Err(ConfigError::Invalid(format!(
            "{field}: longitude of '{}' must be within -180..180",
            loc.name
        )));
    }
    Ok(())
}

// ─── Loading ─────────────────────────────────────────────────────

pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Config> {
    let cfg: Config = serde_yaml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config the way the binary does: `$WEATHER_API_CONFIG` must
/// exist when set; otherwise `weather-api.yaml` is used if present, else the
/// built-in defaults. Returns the config and a description of its source.
pub fn load() -> Result<(Config, String)> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let cfg = load_from_file(&path)?;
        return Ok((cfg, path));
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        let cfg = load_from_file(DEFAULT_CONFIG_PATH)?;
        return Ok((cfg, DEFAULT_CONFIG_PATH.to_string()));
    }
    Ok((Config::default(), "built-in defaults".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_from_str("{}").expect("must parse");
        assert_eq!(cfg.server.listen, "0.0.0.0:8000");
        assert_eq!(cfg.upstream.base_url, "https://archive-api.open-meteo.com");
        assert_eq!(cfg.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.upstream.timezone, "Europe/London");
        assert_eq!(cfg.default_location.name, "London");
        let names: Vec<_> = cfg.cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["New York", "Tokyo", "Sydney"]);
    }

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().expect("defaults must validate");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let bad = r#"
upstream:
  base_url: "http://localhost:9000"
  timeout: 5   # typo for timeout_ms
"#;
        let err = load_from_str(bad).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn custom_city_table_replaces_defaults() {
        let ok = r#"
cities:
  - { name: "Paris", latitude: 48.8566, longitude: 2.3522 }
"#;
        let cfg = load_from_str(ok).expect("must parse");
        assert_eq!(cfg.city("Paris").unwrap().coordinates().latitude, 48.8566);
        assert!(cfg.city("Tokyo").is_none());
    }

    #[test]
    fn city_lookup_is_exact() {
        let cfg = Config::default();
        let ny = cfg.city("New York").unwrap().coordinates();
        assert_eq!(ny, Coordinates { latitude: 40.7128, longitude: -74.0060 });
        assert!(cfg.city("new york").is_none());
        assert!(cfg.city("Mars").is_none());
    }

    #[test]
    fn rejects_out_of_range_values() {
        for bad in [
            "upstream: { timeout_ms: 0 }",
            "window: { end_day: 31 }",
            "window: { start_year: 2024, end_year: 2023 }",
            "upstream: { base_url: \"  \" }",
            "default_location: { name: London, latitude: 91.0, longitude: 0.0 }",
            "cities: []",
            "cities: [{ name: A, latitude: 0, longitude: 0 }, { name: A, latitude: 1, longitude: 1 }]",
        ] {
            let err = load_from_str(bad).expect_err(bad);
            assert!(matches!(err, ConfigError::Invalid(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn window_keeps_day_28_for_every_month() {
        let w = WindowSection::default();
        let (start, end) = w.dates(2).unwrap();
        assert_eq!(start.to_string(), "2018-02-01");
        assert_eq!(end.to_string(), "2023-02-28");
        let (_, end) = w.dates(12).unwrap();
        assert_eq!(end.to_string(), "2023-12-28");
        assert!(w.dates(13).is_none());
    }
}
