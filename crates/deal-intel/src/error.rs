use crate::config::ConfigError;
use crate::market::MarketSignalError;
use crate::telemetry::TelemetryError;
use crate::traffic::TrafficError;
use crate::triage::TriageError;
use std::fmt;

/// Process-level error unifying startup failures and the three service surfaces.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Market(MarketSignalError),
    Traffic(TrafficError),
    Triage(TriageError),
}

impl AppError {
    /// Whether the failure stems from caller input rather than an internal fault.
    pub fn is_rejection(&self) -> bool {
        match self {
            AppError::Market(MarketSignalError::Aggregation(_)) => true,
            AppError::Traffic(TrafficError::PropertyNotFound(_))
            | AppError::Traffic(TrafficError::MissingMarketReport { .. }) => true,
            AppError::Triage(TriageError::DealNotFound(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Market(err) => write!(f, "market signal error: {}", err),
            AppError::Traffic(err) => write!(f, "traffic prediction error: {}", err),
            AppError::Triage(err) => write!(f, "triage error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Market(err) => Some(err),
            AppError::Traffic(err) => Some(err),
            AppError::Triage(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<MarketSignalError> for AppError {
    fn from(value: MarketSignalError) -> Self {
        Self::Market(value)
    }
}

impl From<TrafficError> for AppError {
    fn from(value: TrafficError) -> Self {
        Self::Traffic(value)
    }
}

impl From<TriageError> for AppError {
    fn from(value: TriageError) -> Self {
        Self::Triage(value)
    }
}
