use std::fmt;
use tracing::{info, info_span, Span};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, AppEnvironment, TelemetryConfig};
use crate::market::LocationId;
use crate::traffic::PropertyId;
use crate::triage::DealId;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directive: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, .. } => {
                write!(f, "APP_LOG_LEVEL directive '{directive}' is not a valid filter")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Filter for the configured level. `RUST_LOG` takes precedence when set and valid.
pub fn filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.log_level.clone(),
        source,
    })
}

/// Installs the process-wide subscriber and logs the wiring it was started with.
/// Production keeps event targets and drops ANSI colour for log shippers.
pub fn init(config: &AppConfig) -> Result<(), TelemetryError> {
    let production = config.environment == AppEnvironment::Production;

    tracing_subscriber::fmt()
        .with_env_filter(filter(&config.telemetry)?)
        .with_target(production)
        .with_ansi(!production)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)?;

    info!(
        environment = config.environment.as_str(),
        configured_sources = config.signals.source_urls.len(),
        source_timeout_secs = config.signals.source_timeout.as_secs(),
        report_max_age_hours = config.signals.report_max_age_hours,
        "deal intelligence telemetry installed"
    );
    Ok(())
}

pub fn market_pipeline_span(location: &LocationId) -> Span {
    info_span!("market_signal_pipeline", location = %location)
}

pub fn traffic_prediction_span(property: &PropertyId) -> Span {
    info_span!("traffic_prediction", property = %property)
}

pub fn deal_triage_span(deal: &DealId) -> Span {
    info_span!("deal_triage", deal = %deal)
}
