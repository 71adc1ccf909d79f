//! Weekly walk-in prediction from site attributes and a cached market report.

pub mod calibration;
pub mod confidence;
pub mod demand;
pub mod domain;
mod engine;
pub mod physical;

#[cfg(test)]
pub(crate) mod test_support;

pub use calibration::{CalibrationFactor, CalibrationScope, CalibrationStore, CalibrationTable};
pub use domain::{
    ComponentBreakdown, PredictionConfidence, PredictionWeek, PropertyId, PropertyProfile,
    PropertyType, RoadClass, TemporalSplit, TrafficPrediction,
};
pub use engine::{PredictionRepository, PropertyRepository, TrafficError, TrafficPredictionEngine};
