use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DealId(pub String);

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Centroid of a drawn site boundary, when one exists.
    #[serde(default)]
    pub boundary_centroid: Option<Coordinates>,
}

impl Deal {
    /// Single-line address for geocoding, if any part is known.
    pub fn geocoding_query(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Comparable inventory inside a trade area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySignals {
    pub property_count: u32,
    pub avg_rent: f64,
    /// Fraction in `[0, 1]`.
    pub avg_occupancy: f64,
    /// Fraction in `[0, 1]`.
    pub quality_score: f64,
}

/// Aggregate signals for a trade area. Growth rates are annual percents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeArea {
    pub id: String,
    pub market_strength: f64,
    pub location_quality: f64,
    pub rent_growth_pct: f64,
    pub population_growth_pct: f64,
    pub job_growth_pct: f64,
    pub properties: PropertySignals,
}

impl TradeArea {
    pub fn avg_growth_pct(&self) -> f64 {
        (self.rent_growth_pct + self.population_growth_pct + self.job_growth_pct) / 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageStatus {
    Hot,
    Warm,
    Watch,
    Pass,
}

impl TriageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hot => "Hot",
            Self::Warm => "Warm",
            Self::Watch => "Watch",
            Self::Pass => "Pass",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageScores {
    /// 0 to 15.
    pub location: u8,
    /// 0 to 15.
    pub market: u8,
    pub market_label: String,
    /// 0 to 20.
    pub property: u8,
    /// 0 to 50.
    pub total: u8,
}

/// Outcome of triaging one deal. Re-triage replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub deal_id: DealId,
    pub scores: TriageScores,
    pub status: TriageStatus,
    pub strategies: Vec<String>,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub trade_area_id: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub triaged_at: DateTime<Utc>,
}
