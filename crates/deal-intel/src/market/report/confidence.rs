use super::super::domain::ConfidenceLevel;

pub const HIGH_CONFIDENCE_SOURCES: usize = 4;
pub const MEDIUM_CONFIDENCE_SOURCES: usize = 2;

/// Confidence is a count of sources that answered, nothing more. Source
/// quality is deliberately not weighed.
pub fn classify(sources_available: usize) -> ConfidenceLevel {
    if sources_available >= HIGH_CONFIDENCE_SOURCES {
        ConfidenceLevel::High
    } else if sources_available >= MEDIUM_CONFIDENCE_SOURCES {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
