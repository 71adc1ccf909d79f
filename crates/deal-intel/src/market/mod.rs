//! Market signal pipeline: source connectors, concurrent aggregation, the
//! pure report builder, confidence classification, and the report cache.

pub mod aggregation;
pub mod cache;
pub mod domain;
pub mod normalize;
pub mod report;
pub mod service;
pub mod sources;

pub use aggregation::{AggregationError, AggregationRun, SignalAggregator, SourceFetchOutcome};
pub use cache::{
    CacheError, CachedReportRecord, CachedReportSummary, InMemoryReportCache, ReportCache,
    ReportFilter,
};
pub use domain::{
    ConfidenceLevel, Coordinates, Location, LocationId, MarketAssumptions, SourceKind,
    DEFAULT_JOBS_TO_RETAIL_TRIPS, DEFAULT_JOBS_TO_UNITS,
};
pub use normalize::MarketInputs;
pub use report::MarketSignalReport;
pub use service::{MarketSignalError, MarketSignalService};
pub use sources::{
    DemographicsPayload, EmploymentEvent, EmploymentNewsPayload, HttpSourceConnector,
    PermitPipelinePayload, RentalMarketPayload, SourceConnector, SourceError, SourcePayload,
    ZoningCapacityPayload,
};
