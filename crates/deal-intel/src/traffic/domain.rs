use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::{ConfidenceLevel, LocationId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Office,
    Restaurant,
    Retail,
    Multifamily,
    Industrial,
    Other,
}

impl PropertyType {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Restaurant => "restaurant",
            Self::Retail => "retail",
            Self::Multifamily => "multifamily",
            Self::Industrial => "industrial",
            Self::Other => "other",
        }
    }

    /// Share of weekly visits that land Monday through Friday.
    pub const fn weekday_share(self) -> f64 {
        match self {
            Self::Office => 0.80,
            Self::Restaurant => 0.60,
            Self::Retail => 0.65,
            _ => 0.70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Highway,
    Arterial,
    Collector,
    Local,
}

impl RoadClass {
    /// Typical daily pedestrians passing a frontage when no count exists.
    pub const fn baseline_daily_pedestrians(self) -> f64 {
        match self {
            Self::Highway => 80.0,
            Self::Arterial => 600.0,
            Self::Collector => 350.0,
            Self::Local => 150.0,
        }
    }
}

/// Physical attributes of a property plus the keys that tie it to a market
/// report and to calibration scopes. Scores are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyProfile {
    pub id: PropertyId,
    pub location_id: LocationId,
    pub property_type: PropertyType,
    pub submarket: String,
    pub road_class: RoadClass,
    pub average_daily_traffic: Option<u32>,
    pub frontage_ft: f64,
    pub corner_lot: bool,
    pub sidewalk_score: f64,
    pub signage_score: f64,
    pub entrance_score: f64,
    pub residential_units_nearby: u32,
    pub workers_nearby: u32,
    pub transit_distance_ft: Option<f64>,
    pub transit_daily_ridership: Option<u32>,
    pub competitors_within_500m: u32,
    /// Weeks of observed traffic already used to validate past predictions.
    pub validated_weeks: u32,
}

/// ISO week a prediction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredictionWeek {
    pub year: i32,
    pub week: u32,
}

impl PredictionWeek {
    pub fn containing(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn monday(self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }
}

impl fmt::Display for PredictionWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalComponent {
    pub street_pedestrians: f64,
    pub capture_rate: f64,
    pub street_walkins: f64,
    pub residential_walkins: f64,
    pub worker_walkins: f64,
    pub transit_walkins: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandComponent {
    pub property_share: f64,
    pub employment_traffic: f64,
    pub population_traffic: f64,
    pub retail_demand_traffic: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyDemandAdjustment {
    pub scarcity_multiplier: f64,
    pub demand_multiplier: f64,
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAdjustment {
    pub global: f64,
    pub property_type: f64,
    pub submarket: f64,
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub physical: PhysicalComponent,
    pub demand: DemandComponent,
    pub base_walkins: f64,
    pub supply_demand: SupplyDemandAdjustment,
    pub calibration: CalibrationAdjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSplit {
    pub weekday_share: f64,
    pub weekday_total: f64,
    pub weekend_total: f64,
    pub weekday_daily: f64,
    pub weekend_daily: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub validation_data_availability: f64,
    pub market_report_confidence: f64,
    pub data_completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfidence {
    pub score: f64,
    pub tier: ConfidenceLevel,
    pub breakdown: ConfidenceBreakdown,
}

/// Weekly walk-in estimate keyed by property and ISO week. Recomputing the
/// same key overwrites the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPrediction {
    pub property_id: PropertyId,
    pub week: PredictionWeek,
    pub weekly_walkins: f64,
    pub daily_average: f64,
    pub peak_hour_estimate: f64,
    pub components: ComponentBreakdown,
    pub temporal: TemporalSplit,
    pub confidence: PredictionConfidence,
    pub market_report_generated_at: chrono::DateTime<chrono::Utc>,
}
