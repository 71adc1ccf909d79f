use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ConfidenceLevel, LocationId};
use super::report::MarketSignalReport;

/// Stored form of a report: promoted scalar fields for filtering plus the
/// opaque versioned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedReportRecord {
    pub location_id: LocationId,
    pub submarket_name: String,
    pub confidence_level: ConfidenceLevel,
    pub generated_at: DateTime<Utc>,
    pub schema_version: u32,
    pub document: serde_json::Value,
}

impl CachedReportRecord {
    pub fn from_report(report: &MarketSignalReport) -> Result<Self, CacheError> {
        let document =
            serde_json::to_value(report).map_err(|err| CacheError::Encode(err.to_string()))?;
        Ok(Self {
            location_id: report.location_id.clone(),
            submarket_name: report.submarket_name.clone(),
            confidence_level: report.confidence_level(),
            generated_at: report.generated_at,
            schema_version: report.schema_version,
            document,
        })
    }

    pub fn decode(&self) -> Result<MarketSignalReport, CacheError> {
        serde_json::from_value(self.document.clone()).map_err(|err| CacheError::Corrupt {
            location_id: self.location_id.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn summary(&self) -> CachedReportSummary {
        CachedReportSummary {
            location_id: self.location_id.clone(),
            submarket_name: self.submarket_name.clone(),
            confidence_level: self.confidence_level,
            generated_at: self.generated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedReportSummary {
    pub location_id: LocationId,
    pub submarket_name: String,
    pub confidence_level: ConfidenceLevel,
    pub generated_at: DateTime<Utc>,
}

/// Filter over the promoted fields only; documents are never decoded.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub submarket_name: Option<String>,
    pub min_confidence: Option<ConfidenceLevel>,
}

impl ReportFilter {
    fn matches(&self, record: &CachedReportRecord) -> bool {
        let submarket_ok = self
            .submarket_name
            .as_ref()
            .map(|name| record.submarket_name.eq_ignore_ascii_case(name))
            .unwrap_or(true);
        let confidence_ok = self
            .min_confidence
            .map(|min| record.confidence_level >= min)
            .unwrap_or(true);
        submarket_ok && confidence_ok
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("report could not be encoded: {0}")]
    Encode(String),
    #[error("cached report for {location_id} is unreadable: {reason}")]
    Corrupt { location_id: String, reason: String },
    #[error("report cache unavailable: {0}")]
    Unavailable(String),
}

/// Report store keyed by location id. Writes are unconditional upserts (last
/// write wins) and nothing is evicted.
pub trait ReportCache: Send + Sync {
    fn upsert(&self, record: CachedReportRecord) -> Result<(), CacheError>;
    fn fetch(&self, location_id: &LocationId) -> Result<Option<CachedReportRecord>, CacheError>;
    fn records(&self) -> Result<Vec<CachedReportRecord>, CacheError>;

    fn put(&self, report: &MarketSignalReport) -> Result<(), CacheError> {
        let record = CachedReportRecord::from_report(report)?;
        debug!(
            location = %record.location_id,
            generated_at = %record.generated_at,
            "caching market report"
        );
        self.upsert(record)
    }

    /// Most recent report regardless of age.
    fn latest(&self, location_id: &LocationId) -> Result<Option<MarketSignalReport>, CacheError> {
        self.fetch(location_id)?
            .map(|record| record.decode())
            .transpose()
    }

    /// Cached report only when it is at most `max_age_hours` old.
    fn get(
        &self,
        location_id: &LocationId,
        max_age_hours: i64,
    ) -> Result<Option<MarketSignalReport>, CacheError> {
        self.get_at(location_id, max_age_hours, Utc::now())
    }

    fn get_at(
        &self,
        location_id: &LocationId,
        max_age_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<MarketSignalReport>, CacheError> {
        let Some(record) = self.fetch(location_id)? else {
            debug!(location = %location_id, "market report cache miss");
            return Ok(None);
        };

        // A window too large for chrono to represent admits every age.
        let stale = max_age_hours < 0
            || Duration::try_hours(max_age_hours)
                .map_or(false, |window| now - record.generated_at > window);
        if stale {
            debug!(location = %location_id, max_age_hours, "cached market report is stale");
            return Ok(None);
        }

        record.decode().map(Some)
    }

    fn summaries(&self, filter: &ReportFilter) -> Result<Vec<CachedReportSummary>, CacheError> {
        let mut summaries: Vec<_> = self
            .records()?
            .iter()
            .filter(|record| filter.matches(record))
            .map(CachedReportRecord::summary)
            .collect();
        summaries.sort_by(|a, b| a.location_id.cmp(&b.location_id));
        Ok(summaries)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReportCache {
    entries: DashMap<LocationId, CachedReportRecord>,
}

impl InMemoryReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReportCache for InMemoryReportCache {
    fn upsert(&self, record: CachedReportRecord) -> Result<(), CacheError> {
        self.entries.insert(record.location_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, location_id: &LocationId) -> Result<Option<CachedReportRecord>, CacheError> {
        Ok(self.entries.get(location_id).map(|entry| entry.value().clone()))
    }

    fn records(&self) -> Result<Vec<CachedReportRecord>, CacheError> {
        Ok(self.entries.iter().map(|entry| entry.value().clone()).collect())
    }
}
