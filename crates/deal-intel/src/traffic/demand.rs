use super::domain::{DemandComponent, PropertyProfile, SupplyDemandAdjustment};
use crate::market::{MarketAssumptions, MarketSignalReport};

pub const BASE_PROPERTY_SHARE: f64 = 0.03;
pub const MAX_PROPERTY_SHARE: f64 = 0.10;
pub const POPULATION_WEEKLY_TRIPS: f64 = 0.25;
pub const OCCUPIED_UNIT_WEEKLY_TRIPS: f64 = 0.5;
/// Occupancy assumed when the rental source did not report one.
pub const TYPICAL_OCCUPANCY: f64 = 0.90;

/// Fraction of market-wide trips this property can expect to capture.
pub fn property_share(profile: &PropertyProfile) -> f64 {
    let mut share = BASE_PROPERTY_SHARE;
    if profile.corner_lot {
        share *= 1.5;
    }
    if profile.frontage_ft > 100.0 {
        share *= 1.3;
    }
    if profile.competitors_within_500m < 5 {
        share *= 1.4;
    }
    share.min(MAX_PROPERTY_SHARE)
}

/// Weekly walk-ins translated from the cached market report.
pub fn demand_component(
    report: &MarketSignalReport,
    profile: &PropertyProfile,
    assumptions: &MarketAssumptions,
) -> DemandComponent {
    let share = property_share(profile);

    let employment_traffic =
        report.employment.net_jobs.max(0.0) * assumptions.jobs_to_retail_trips * share;
    let population_traffic = report.demand.population * POPULATION_WEEKLY_TRIPS * share;
    let occupancy = report.demand.avg_occupancy.unwrap_or(TYPICAL_OCCUPANCY);
    let retail_demand_traffic =
        report.supply.existing_units * occupancy * OCCUPIED_UNIT_WEEKLY_TRIPS * share;

    DemandComponent {
        property_share: share,
        employment_traffic,
        population_traffic,
        retail_demand_traffic,
        total: employment_traffic + population_traffic + retail_demand_traffic,
    }
}

pub fn supply_demand_adjustment(report: &MarketSignalReport) -> SupplyDemandAdjustment {
    let future_supply_ratio = report.capacity.future_supply_ratio;
    let scarcity_multiplier = if future_supply_ratio < 150.0 {
        1.2
    } else if future_supply_ratio > 250.0 {
        0.85
    } else {
        1.0
    };

    let absorption = report.employment.demand_absorption_vs_future;
    let demand_multiplier = if absorption > 150.0 {
        1.15
    } else if absorption < 50.0 {
        0.90
    } else {
        1.0
    };

    SupplyDemandAdjustment {
        scarcity_multiplier,
        demand_multiplier,
        combined: scarcity_multiplier * demand_multiplier,
    }
}
