use super::domain::{ConfidenceBreakdown, PredictionConfidence};
use crate::market::ConfidenceLevel;

pub const VALIDATION_WEIGHT: f64 = 0.40;
pub const MARKET_REPORT_WEIGHT: f64 = 0.35;
pub const COMPLETENESS_WEIGHT: f64 = 0.25;
/// Validated weeks at which validation data counts as fully available.
pub const FULL_VALIDATION_WEEKS: f64 = 8.0;

pub fn market_report_confidence(level: ConfidenceLevel) -> f64 {
    match level {
        ConfidenceLevel::High => 1.0,
        ConfidenceLevel::Medium => 0.6,
        ConfidenceLevel::Low => 0.3,
    }
}

pub fn prediction_confidence(
    validated_weeks: u32,
    report_level: ConfidenceLevel,
    has_adt: bool,
    has_demographics: bool,
) -> PredictionConfidence {
    let validation_data_availability = (validated_weeks as f64 / FULL_VALIDATION_WEEKS).min(1.0);
    let market_report_confidence = market_report_confidence(report_level);
    let data_completeness =
        0.5 * f64::from(u8::from(has_adt)) + 0.5 * f64::from(u8::from(has_demographics));

    let score = VALIDATION_WEIGHT * validation_data_availability
        + MARKET_REPORT_WEIGHT * market_report_confidence
        + COMPLETENESS_WEIGHT * data_completeness;

    PredictionConfidence {
        score,
        tier: tier(score),
        breakdown: ConfidenceBreakdown {
            validation_data_availability,
            market_report_confidence,
            data_completeness,
        },
    }
}

pub fn tier(score: f64) -> ConfidenceLevel {
    if score >= 0.75 {
        ConfidenceLevel::High
    } else if score >= 0.50 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_backed_prediction_is_high() {
        let confidence = prediction_confidence(12, ConfidenceLevel::High, true, true);
        assert!((confidence.score - 1.0).abs() < 1e-12);
        assert_eq!(confidence.tier, ConfidenceLevel::High);
    }

    #[test]
    fn unvalidated_medium_report_is_low() {
        // 0.35 * 0.6 + 0.25 * 0.5
        let confidence = prediction_confidence(0, ConfidenceLevel::Medium, false, true);
        assert!((confidence.score - 0.335).abs() < 1e-12);
        assert_eq!(confidence.tier, ConfidenceLevel::Low);
    }

    #[test]
    fn half_validated_high_report_is_medium() {
        // 0.4 * 0.5 + 0.35 + 0.25 * 0.5
        let confidence = prediction_confidence(4, ConfidenceLevel::High, true, false);
        assert!((confidence.score - 0.675).abs() < 1e-12);
        assert_eq!(confidence.tier, ConfidenceLevel::Medium);
    }
}
