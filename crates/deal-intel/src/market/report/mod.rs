mod builder;
pub mod confidence;
pub mod views;

pub use builder::{
    affordability, build_report, demand_indicators, employment_impact, market_capacity,
    per_capita_analysis, supply_analysis,
};
pub use views::{
    DataQuality, DemandIndicators, EmploymentImpact, LegacyCompositeScores, MarketCapacity,
    MarketSignalReport, PerCapitaAnalysis, SupplyAnalysis, REPORT_SCHEMA_VERSION,
};
