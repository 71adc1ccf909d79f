use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::domain::{Coordinates, SourceKind};

/// Rental comps and occupancy around the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalMarketPayload {
    pub submarket_name: Option<String>,
    pub existing_units: Option<u64>,
    pub avg_rent: Option<f64>,
    pub avg_occupancy: Option<f64>,
    pub properties_in_market: Option<u32>,
    pub properties_with_concessions: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicsPayload {
    pub population: Option<u64>,
    pub households: Option<u64>,
    pub median_household_income: Option<f64>,
    /// Annual growth in percent.
    pub population_growth_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentEvent {
    pub company: Option<String>,
    pub jobs_added: Option<i64>,
    pub jobs_removed: Option<i64>,
    pub announced_on: Option<NaiveDate>,
}

/// Hiring and layoff announcements near the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentNewsPayload {
    pub events: Vec<EmploymentEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermitPipelinePayload {
    pub units_under_construction: Option<u64>,
    pub units_permitted: Option<u64>,
    pub active_projects: Option<u32>,
}

/// Buildable capacity implied by current zoning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoningCapacityPayload {
    pub theoretical_max_units: Option<u64>,
    pub vacant_parcels: Option<u32>,
    pub total_parcels: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "payload", rename_all = "snake_case")]
pub enum SourcePayload {
    RentalMarket(RentalMarketPayload),
    Demographics(DemographicsPayload),
    EmploymentNews(EmploymentNewsPayload),
    PermitPipeline(PermitPipelinePayload),
    ZoningCapacity(ZoningCapacityPayload),
}

impl SourcePayload {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourcePayload::RentalMarket(_) => SourceKind::RentalMarket,
            SourcePayload::Demographics(_) => SourceKind::Demographics,
            SourcePayload::EmploymentNews(_) => SourceKind::EmploymentNews,
            SourcePayload::PermitPipeline(_) => SourceKind::PermitPipeline,
            SourcePayload::ZoningCapacity(_) => SourceKind::ZoningCapacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("source timed out after {0:?}")]
    Timeout(Duration),
    #[error("source transport failed: {0}")]
    Transport(String),
    #[error("source returned status {0}")]
    Status(u16),
    #[error("source payload could not be decoded: {0}")]
    Decode(String),
    #[error("connector returned {actual} data when {expected} was requested")]
    WrongKind {
        expected: SourceKind,
        actual: SourceKind,
    },
}

/// One external data category. Implementations only ever report their own
/// failure; the aggregator decides what a failure means.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(
        &self,
        point: Coordinates,
        radius_miles: f64,
    ) -> Result<SourcePayload, SourceError>;
}

/// JSON-over-HTTP connector: `GET {base_url}?lat=..&lng=..&radius_miles=..`.
pub struct HttpSourceConnector {
    kind: SourceKind,
    base_url: String,
    client: reqwest::Client,
}

impl HttpSourceConnector {
    pub fn new(kind: SourceKind, base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        Ok(Self::with_client(kind, base_url, client))
    }

    pub fn with_client(
        kind: SourceKind,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            client,
        }
    }

    pub(crate) fn decode(kind: SourceKind, body: &[u8]) -> Result<SourcePayload, SourceError> {
        fn parse<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, SourceError> {
            serde_json::from_slice(body).map_err(|err| SourceError::Decode(err.to_string()))
        }

        Ok(match kind {
            SourceKind::RentalMarket => SourcePayload::RentalMarket(parse(body)?),
            SourceKind::Demographics => SourcePayload::Demographics(parse(body)?),
            SourceKind::EmploymentNews => SourcePayload::EmploymentNews(parse(body)?),
            SourceKind::PermitPipeline => SourcePayload::PermitPipeline(parse(body)?),
            SourceKind::ZoningCapacity => SourcePayload::ZoningCapacity(parse(body)?),
        })
    }
}

#[async_trait]
impl SourceConnector for HttpSourceConnector {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        point: Coordinates,
        radius_miles: f64,
    ) -> Result<SourcePayload, SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lng", point.lng.to_string()),
                ("radius_miles", radius_miles.to_string()),
            ])
            .send()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SourceError::Transport(err.to_string()))?;
        Self::decode(self.kind, &body)
    }
}
