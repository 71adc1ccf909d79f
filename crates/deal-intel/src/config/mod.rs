use std::env;
use std::fmt;
use std::time::Duration;

use crate::market::{MarketAssumptions, SourceKind};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration for the signal pipeline and its consumers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub signals: SignalsConfig,
    pub assumptions: MarketAssumptions,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let search_radius_miles = parse_var("SIGNALS_SEARCH_RADIUS_MILES", 3.0_f64)?;
        if !(search_radius_miles.is_finite() && search_radius_miles > 0.0) {
            return Err(ConfigError::InvalidNumber {
                variable: "SIGNALS_SEARCH_RADIUS_MILES",
            });
        }
        let timeout_secs = parse_var("SIGNALS_SOURCE_TIMEOUT_SECS", 20_u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "SIGNALS_SOURCE_TIMEOUT_SECS",
            });
        }
        let report_max_age_hours = parse_var("SIGNALS_REPORT_MAX_AGE_HOURS", 24_i64)?;
        if report_max_age_hours < 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "SIGNALS_REPORT_MAX_AGE_HOURS",
            });
        }

        let defaults = MarketAssumptions::default();
        let assumptions = MarketAssumptions {
            jobs_to_units: parse_var("MARKET_JOBS_TO_UNITS", defaults.jobs_to_units)?,
            jobs_to_retail_trips: parse_var(
                "MARKET_JOBS_TO_RETAIL_TRIPS",
                defaults.jobs_to_retail_trips,
            )?,
            ..defaults
        };

        let source_urls = SourceKind::ordered()
            .into_iter()
            .filter_map(|kind| {
                env::var(kind.url_variable())
                    .ok()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .map(|url| (kind, url))
            })
            .collect();

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            signals: SignalsConfig {
                search_radius_miles,
                source_timeout: Duration::from_secs(timeout_secs),
                report_max_age_hours,
                source_urls,
            },
            assumptions,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling connector fan-out and report freshness.
#[derive(Debug, Clone)]
pub struct SignalsConfig {
    pub search_radius_miles: f64,
    pub source_timeout: Duration,
    pub report_max_age_hours: i64,
    pub source_urls: Vec<(SourceKind, String)>,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            search_radius_miles: 3.0,
            source_timeout: Duration::from_secs(20),
            report_max_age_hours: 24,
            source_urls: Vec::new(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{} must be a valid positive number", variable)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
