//! Automatic priority triage for newly created deals.

pub mod domain;
pub mod scoring;
mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Deal, DealId, PropertySignals, TradeArea, TriageResult, TriageScores, TriageStatus,
};
pub use service::{
    DealRepository, DealTriageService, Geocoder, LookupError, TradeAreaResolver, TriageError,
    TriageRepository,
};
