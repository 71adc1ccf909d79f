use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier shared by a location and the report cached for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Site descriptor that triggers report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Location {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

/// External data categories, one connector each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    RentalMarket,
    Demographics,
    EmploymentNews,
    PermitPipeline,
    ZoningCapacity,
}

impl SourceKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::RentalMarket,
            Self::Demographics,
            Self::EmploymentNews,
            Self::PermitPipeline,
            Self::ZoningCapacity,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::RentalMarket => "rental_market",
            Self::Demographics => "demographics",
            Self::EmploymentNews => "employment_news",
            Self::PermitPipeline => "permit_pipeline",
            Self::ZoningCapacity => "zoning_capacity",
        }
    }

    pub(crate) const fn url_variable(self) -> &'static str {
        match self {
            Self::RentalMarket => "SIGNALS_RENTAL_MARKET_URL",
            Self::Demographics => "SIGNALS_DEMOGRAPHICS_URL",
            Self::EmploymentNews => "SIGNALS_EMPLOYMENT_NEWS_URL",
            Self::PermitPipeline => "SIGNALS_PERMIT_PIPELINE_URL",
            Self::ZoningCapacity => "SIGNALS_ZONING_CAPACITY_URL",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

pub const DEFAULT_JOBS_TO_UNITS: f64 = 0.45;
pub const DEFAULT_JOBS_TO_RETAIL_TRIPS: f64 = 15.0;
pub const DEFAULT_BUILDABLE_REALIZATION: f64 = 0.70;
pub const DEFAULT_WORKERS_PER_RESIDENT: f64 = 0.57;

/// Per-market multipliers. This is the one override point for the
/// hand-tuned ratios; everything else reads them from here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketAssumptions {
    /// Housing units demanded per net new job.
    pub jobs_to_units: f64,
    /// Weekly retail trips generated per net new job.
    pub jobs_to_retail_trips: f64,
    /// Share of theoretical zoning capacity that realistically gets built.
    pub buildable_realization: f64,
    /// Employed share of the resident population.
    pub workers_per_resident: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            jobs_to_units: DEFAULT_JOBS_TO_UNITS,
            jobs_to_retail_trips: DEFAULT_JOBS_TO_RETAIL_TRIPS,
            buildable_realization: DEFAULT_BUILDABLE_REALIZATION,
            workers_per_resident: DEFAULT_WORKERS_PER_RESIDENT,
        }
    }
}
