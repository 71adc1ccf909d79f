use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::super::domain::{ConfidenceLevel, LocationId, SourceKind};

pub const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyAnalysis {
    pub existing_units: f64,
    pub units_under_construction: f64,
    pub units_permitted: f64,
    pub pipeline_units: f64,
    pub pipeline_ratio: f64,
    pub active_projects: u32,
    pub properties_in_market: f64,
    pub concession_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandIndicators {
    pub population: f64,
    pub households: f64,
    pub median_income: Option<f64>,
    pub population_growth_pct: Option<f64>,
    pub avg_rent: Option<f64>,
    pub avg_occupancy: Option<f64>,
    pub demand_strength: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCapitaAnalysis {
    pub units_per_1000_people: f64,
    pub rent_to_income_ratio: Option<f64>,
    pub affordability: String,
    pub jobs_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentImpact {
    pub events: usize,
    pub jobs_added: f64,
    pub jobs_removed: f64,
    pub net_jobs: f64,
    pub total_units_demand_from_news: f64,
    pub demand_absorption_vs_future: f64,
    pub demand_verdict: String,
    pub supply_balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapacity {
    pub theoretical_max_units: f64,
    pub realistic_buildable_units: f64,
    pub future_supply_ratio: f64,
    pub market_size_multiplier: f64,
    pub vacant_parcel_ratio: f64,
    pub rezoning_likelihood: String,
    pub risk_level: String,
}

/// Composite scores written by the first report schema. Only ever present
/// on documents decoded from that version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCompositeScores {
    pub supply_score: Option<f64>,
    pub demand_score: Option<f64>,
    pub overall_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub sources_available: BTreeSet<SourceKind>,
    pub sources_missing: BTreeSet<SourceKind>,
    pub confidence_level: ConfidenceLevel,
}

impl DataQuality {
    pub fn has(&self, kind: SourceKind) -> bool {
        self.sources_available.contains(&kind)
    }
}

pub const REPORT_SCHEMA_VERSION: u32 = 2;

/// Composite report for one location at one generation time. Built once,
/// never mutated; regenerating produces a new value that replaces the cached one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignalReport {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    pub location_id: LocationId,
    pub submarket_name: String,
    pub generated_at: DateTime<Utc>,
    pub supply: SupplyAnalysis,
    pub demand: DemandIndicators,
    pub per_capita: PerCapitaAnalysis,
    pub employment: EmploymentImpact,
    pub capacity: MarketCapacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_scores: Option<LegacyCompositeScores>,
    pub data_quality: DataQuality,
}

fn legacy_schema_version() -> u32 {
    1
}

impl MarketSignalReport {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.data_quality.confidence_level
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.generated_at
    }
}
