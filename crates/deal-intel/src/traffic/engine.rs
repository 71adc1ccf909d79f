use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::calibration::{CalibrationStore, CalibrationTable};
use super::confidence::prediction_confidence;
use super::demand::{demand_component, supply_demand_adjustment};
use super::domain::{
    ComponentBreakdown, PredictionWeek, PropertyId, PropertyProfile, TemporalSplit,
    TrafficPrediction,
};
use super::physical::physical_component;
use crate::market::{CacheError, MarketAssumptions, ReportCache, SourceKind};
use crate::repository::RepositoryError;
use crate::telemetry;

pub const PHYSICAL_WEIGHT: f64 = 0.60;
pub const DEMAND_WEIGHT: f64 = 0.40;
/// Share of a day's visits expected in the busiest hour.
pub const PEAK_HOUR_SHARE: f64 = 0.12;

pub trait PropertyRepository: Send + Sync {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertyProfile>, RepositoryError>;
}

pub trait PredictionRepository: Send + Sync {
    fn upsert(&self, prediction: TrafficPrediction) -> Result<(), RepositoryError>;
    fn fetch(
        &self,
        property_id: &PropertyId,
        week: PredictionWeek,
    ) -> Result<Option<TrafficPrediction>, RepositoryError>;
}

/// Blends site attributes with a cached market report into a weekly
/// walk-in estimate.
pub struct TrafficPredictionEngine {
    properties: Arc<dyn PropertyRepository>,
    reports: Arc<dyn ReportCache>,
    calibration: Arc<dyn CalibrationStore>,
    predictions: Arc<dyn PredictionRepository>,
    assumptions: MarketAssumptions,
}

impl TrafficPredictionEngine {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        reports: Arc<dyn ReportCache>,
        calibration: Arc<dyn CalibrationStore>,
        predictions: Arc<dyn PredictionRepository>,
        assumptions: MarketAssumptions,
    ) -> Self {
        Self {
            properties,
            reports,
            calibration,
            predictions,
            assumptions,
        }
    }

    /// Predict and persist walk-ins for `target_week`, defaulting to the
    /// current ISO week. Requires a cached report for the property's location.
    pub fn predict(
        &self,
        property_id: &PropertyId,
        target_week: Option<PredictionWeek>,
    ) -> Result<TrafficPrediction, TrafficError> {
        let _span = telemetry::traffic_prediction_span(property_id).entered();
        let week = target_week
            .unwrap_or_else(|| PredictionWeek::containing(Utc::now().date_naive()));
        let week_start = week.monday().ok_or(TrafficError::InvalidWeek {
            year: week.year,
            week: week.week,
        })?;

        let property = self
            .properties
            .fetch(property_id)?
            .ok_or_else(|| TrafficError::PropertyNotFound(property_id.to_string()))?;

        let report = self.reports.latest(&property.location_id)?.ok_or_else(|| {
            TrafficError::MissingMarketReport {
                property_id: property_id.to_string(),
                location_id: property.location_id.to_string(),
            }
        })?;

        let physical = physical_component(&property);
        let demand = demand_component(&report, &property, &self.assumptions);
        let base_walkins = PHYSICAL_WEIGHT * physical.total + DEMAND_WEIGHT * demand.total;
        let supply_demand = supply_demand_adjustment(&report);

        let factors = self.calibration.active_factors(week_start)?;
        let calibration = CalibrationTable::from_factors(&factors)
            .adjustment_for(property.property_type, &property.submarket);

        let weekly_walkins = base_walkins * supply_demand.combined * calibration.combined;
        let daily_average = weekly_walkins / 7.0;

        let confidence = prediction_confidence(
            property.validated_weeks,
            report.confidence_level(),
            property.average_daily_traffic.is_some(),
            report.data_quality.has(SourceKind::Demographics),
        );

        let prediction = TrafficPrediction {
            property_id: property.id.clone(),
            week,
            weekly_walkins,
            daily_average,
            peak_hour_estimate: daily_average * PEAK_HOUR_SHARE,
            temporal: temporal_split(weekly_walkins, property.property_type.weekday_share()),
            components: ComponentBreakdown {
                physical,
                demand,
                base_walkins,
                supply_demand,
                calibration,
            },
            confidence,
            market_report_generated_at: report.generated_at,
        };

        self.predictions.upsert(prediction.clone())?;

        info!(
            week = %prediction.week,
            weekly_walkins = prediction.weekly_walkins.round(),
            tier = prediction.confidence.tier.label(),
            "traffic prediction stored"
        );

        Ok(prediction)
    }
}

fn temporal_split(weekly: f64, weekday_share: f64) -> TemporalSplit {
    let weekday_total = weekly * weekday_share;
    let weekend_total = weekly - weekday_total;
    TemporalSplit {
        weekday_share,
        weekday_total,
        weekend_total,
        weekday_daily: weekday_total / 5.0,
        weekend_daily: weekend_total / 2.0,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("property {0} not found")]
    PropertyNotFound(String),
    #[error("no cached market report for {location_id} (property {property_id})")]
    MissingMarketReport {
        property_id: String,
        location_id: String,
    },
    #[error("{year}-W{week} is not a valid ISO week")]
    InvalidWeek { year: i32, week: u32 },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
