use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::super::domain::{Location, MarketAssumptions, SourceKind};
use super::super::normalize::{kinds_present, MarketInputs};
use super::super::sources::SourcePayload;
use super::confidence;
use super::views::{
    DataQuality, DemandIndicators, EmploymentImpact, MarketCapacity, MarketSignalReport,
    PerCapitaAnalysis, SupplyAnalysis, REPORT_SCHEMA_VERSION, UNKNOWN,
};

/// Rent-to-income percentage under which a market counts as affordable.
pub const AFFORDABLE_RENT_TO_INCOME_PCT: f64 = 25.0;
pub const STRETCHED_RENT_TO_INCOME_PCT: f64 = 35.0;

pub const HIGH_REZONING_VACANT_RATIO: f64 = 0.30;
pub const MEDIUM_REZONING_VACANT_RATIO: f64 = 0.15;

pub const STRONG_OCCUPANCY: f64 = 0.95;
pub const MODERATE_OCCUPANCY: f64 = 0.90;

/// Assembles the full report from whichever payloads arrived. Pure: the same
/// payloads and timestamp always produce the same report.
pub fn build_report(
    location: &Location,
    payloads: &[SourcePayload],
    generated_at: DateTime<Utc>,
    assumptions: &MarketAssumptions,
) -> MarketSignalReport {
    let inputs = MarketInputs::from_payloads(payloads);
    let sources_available = kinds_present(payloads);
    let sources_missing: BTreeSet<SourceKind> = SourceKind::ordered()
        .into_iter()
        .filter(|kind| !sources_available.contains(kind))
        .collect();
    let confidence_level = confidence::classify(sources_available.len());

    let submarket_name = inputs
        .submarket_name
        .clone()
        .or_else(|| location.city.clone().filter(|city| !city.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let capacity = market_capacity(&inputs, assumptions);

    MarketSignalReport {
        schema_version: REPORT_SCHEMA_VERSION,
        location_id: location.id.clone(),
        submarket_name,
        generated_at,
        supply: supply_analysis(&inputs),
        demand: demand_indicators(&inputs),
        per_capita: per_capita_analysis(&inputs, assumptions),
        employment: employment_impact(&inputs, &capacity, assumptions),
        capacity,
        legacy_scores: None,
        data_quality: DataQuality {
            sources_available,
            sources_missing,
            confidence_level,
        },
    }
}

pub fn supply_analysis(inputs: &MarketInputs) -> SupplyAnalysis {
    let pipeline_units = inputs.pipeline_units();
    SupplyAnalysis {
        existing_units: inputs.existing_units,
        units_under_construction: inputs.units_under_construction,
        units_permitted: inputs.units_permitted,
        pipeline_units,
        pipeline_ratio: round2(percent(pipeline_units, inputs.existing_units)),
        active_projects: inputs.active_projects,
        properties_in_market: inputs.properties_in_market,
        concession_rate: round2(percent(
            inputs.properties_with_concessions,
            inputs.properties_in_market,
        )),
    }
}

pub fn demand_indicators(inputs: &MarketInputs) -> DemandIndicators {
    let demand_strength = match inputs.avg_occupancy {
        Some(occupancy) if occupancy >= STRONG_OCCUPANCY => "STRONG",
        Some(occupancy) if occupancy >= MODERATE_OCCUPANCY => "MODERATE",
        Some(_) => "WEAK",
        None => UNKNOWN,
    };

    DemandIndicators {
        population: inputs.population,
        households: inputs.households,
        median_income: inputs.median_income,
        population_growth_pct: inputs.population_growth_pct,
        avg_rent: inputs.avg_rent,
        avg_occupancy: inputs.avg_occupancy,
        demand_strength: demand_strength.to_string(),
    }
}

pub fn per_capita_analysis(
    inputs: &MarketInputs,
    assumptions: &MarketAssumptions,
) -> PerCapitaAnalysis {
    let rent_to_income_ratio = match (inputs.avg_rent, inputs.median_income) {
        (Some(rent), Some(income)) => Some(round2(percent(rent * 12.0, income))),
        _ => None,
    };

    PerCapitaAnalysis {
        units_per_1000_people: round2(ratio(inputs.existing_units, inputs.population) * 1000.0),
        rent_to_income_ratio,
        affordability: affordability(rent_to_income_ratio).to_string(),
        jobs_per_unit: round2(ratio(
            inputs.population * assumptions.workers_per_resident,
            inputs.existing_units,
        )),
    }
}

pub fn affordability(rent_to_income_pct: Option<f64>) -> &'static str {
    match rent_to_income_pct {
        Some(pct) if pct < AFFORDABLE_RENT_TO_INCOME_PCT => "AFFORDABLE",
        Some(pct) if pct < STRETCHED_RENT_TO_INCOME_PCT => "STRETCHED",
        Some(_) => "EXPENSIVE",
        None => UNKNOWN,
    }
}

pub fn employment_impact(
    inputs: &MarketInputs,
    capacity: &MarketCapacity,
    assumptions: &MarketAssumptions,
) -> EmploymentImpact {
    let net_jobs = inputs.net_jobs();
    let demand_units = net_jobs * assumptions.jobs_to_units;
    let incoming_supply = inputs.pipeline_units() + capacity.realistic_buildable_units;
    let absorption = percent(demand_units, incoming_supply);

    let (demand_verdict, supply_balance) = if absorption > 100.0 {
        ("STRONG", "FAVORABLE")
    } else if absorption > 50.0 {
        ("MODERATE", "BALANCED")
    } else {
        ("WEAK", "UNFAVORABLE")
    };

    EmploymentImpact {
        events: inputs.employment_events,
        jobs_added: inputs.jobs_added,
        jobs_removed: inputs.jobs_removed,
        net_jobs,
        total_units_demand_from_news: round2(demand_units),
        demand_absorption_vs_future: round2(absorption),
        demand_verdict: demand_verdict.to_string(),
        supply_balance: supply_balance.to_string(),
    }
}

pub fn market_capacity(inputs: &MarketInputs, assumptions: &MarketAssumptions) -> MarketCapacity {
    let realistic_buildable_units =
        (inputs.theoretical_max_units * assumptions.buildable_realization).round();
    let market_size_multiplier = ratio(
        inputs.existing_units + inputs.pipeline_units() + realistic_buildable_units,
        inputs.existing_units,
    );
    let vacant_parcel_ratio = ratio(inputs.vacant_parcels, inputs.total_parcels);

    let rezoning_likelihood = if inputs.total_parcels <= 0.0 {
        UNKNOWN
    } else if vacant_parcel_ratio > HIGH_REZONING_VACANT_RATIO {
        "HIGH"
    } else if vacant_parcel_ratio > MEDIUM_REZONING_VACANT_RATIO {
        "MEDIUM"
    } else {
        "LOW"
    };

    let risk_level = if market_size_multiplier > 3.0 {
        "HIGH RISK"
    } else if market_size_multiplier > 2.0 {
        "MODERATE RISK"
    } else {
        "LOW RISK"
    };

    MarketCapacity {
        theoretical_max_units: inputs.theoretical_max_units,
        realistic_buildable_units,
        future_supply_ratio: round2(percent(realistic_buildable_units, inputs.existing_units)),
        market_size_multiplier: round2(market_size_multiplier),
        vacant_parcel_ratio: round2(vacant_parcel_ratio),
        rezoning_likelihood: rezoning_likelihood.to_string(),
        risk_level: risk_level.to_string(),
    }
}

/// Zero denominators yield 0, never NaN or infinity.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

fn percent(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Half-cent values round away from zero even when the product landed a hair
/// below the midpoint.
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled == 0.0 || !scaled.is_finite() {
        return scaled / 100.0;
    }
    let nudge = scaled.signum() * scaled.abs().max(1.0) * ROUNDING_TOLERANCE;
    (scaled + nudge).round() / 100.0
}

const ROUNDING_TOLERANCE: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::domain::{ConfidenceLevel, LocationId};
    use crate::market::sources::{
        DemographicsPayload, EmploymentEvent, EmploymentNewsPayload, PermitPipelinePayload,
        RentalMarketPayload, ZoningCapacityPayload,
    };
    use chrono::TimeZone;

    fn location() -> Location {
        Location {
            id: LocationId("loc-des-moines-east".to_string()),
            lat: Some(41.59),
            lng: Some(-93.6),
            city: Some("Des Moines".to_string()),
            state: Some("IA".to_string()),
            address: None,
        }
    }

    fn full_payloads() -> Vec<SourcePayload> {
        vec![
            SourcePayload::RentalMarket(RentalMarketPayload {
                submarket_name: Some("East Village".to_string()),
                existing_units: Some(4000),
                avg_rent: Some(1500.0),
                avg_occupancy: Some(0.93),
                properties_in_market: Some(40),
                properties_with_concessions: Some(10),
            }),
            SourcePayload::Demographics(DemographicsPayload {
                population: Some(50_000),
                households: Some(21_000),
                median_household_income: Some(60_000.0),
                population_growth_pct: Some(1.8),
            }),
            SourcePayload::EmploymentNews(EmploymentNewsPayload {
                events: vec![
                    EmploymentEvent {
                        company: Some("Principal".to_string()),
                        jobs_added: Some(1200),
                        jobs_removed: None,
                        announced_on: None,
                    },
                    EmploymentEvent {
                        company: Some("Warehouse Co".to_string()),
                        jobs_added: None,
                        jobs_removed: Some(200),
                        announced_on: None,
                    },
                ],
            }),
            SourcePayload::PermitPipeline(PermitPipelinePayload {
                units_under_construction: Some(300),
                units_permitted: Some(100),
                active_projects: Some(6),
            }),
            SourcePayload::ZoningCapacity(ZoningCapacityPayload {
                theoretical_max_units: Some(1200),
                vacant_parcels: Some(20),
                total_parcels: Some(100),
            }),
        ]
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn full_source_set_produces_expected_views() {
        let report = build_report(
            &location(),
            &full_payloads(),
            generated_at(),
            &MarketAssumptions::default(),
        );

        assert_eq!(report.submarket_name, "East Village");
        assert_eq!(report.data_quality.confidence_level, ConfidenceLevel::High);
        assert!(report.data_quality.sources_missing.is_empty());

        assert_eq!(report.supply.pipeline_units, 400.0);
        assert_eq!(report.supply.pipeline_ratio, 10.0);
        assert_eq!(report.supply.concession_rate, 25.0);

        assert_eq!(report.capacity.realistic_buildable_units, 840.0);
        assert_eq!(report.capacity.future_supply_ratio, 21.0);
        assert_eq!(report.capacity.market_size_multiplier, 1.31);
        assert_eq!(report.capacity.rezoning_likelihood, "MEDIUM");
        assert_eq!(report.capacity.risk_level, "LOW RISK");

        assert_eq!(report.per_capita.units_per_1000_people, 80.0);
        assert_eq!(report.per_capita.rent_to_income_ratio, Some(30.0));
        assert_eq!(report.per_capita.affordability, "STRETCHED");
        assert_eq!(report.per_capita.jobs_per_unit, 7.13);

        assert_eq!(report.employment.net_jobs, 1000.0);
        assert_eq!(report.employment.total_units_demand_from_news, 450.0);
        assert_eq!(report.employment.demand_absorption_vs_future, 36.29);
        assert_eq!(report.employment.demand_verdict, "WEAK");
        assert_eq!(report.employment.supply_balance, "UNFAVORABLE");

        assert_eq!(report.demand.demand_strength, "MODERATE");
    }

    #[test]
    fn zero_existing_units_never_produce_nan() {
        let payloads = vec![
            SourcePayload::PermitPipeline(PermitPipelinePayload {
                units_under_construction: Some(250),
                units_permitted: Some(80),
                active_projects: None,
            }),
            SourcePayload::ZoningCapacity(ZoningCapacityPayload {
                theoretical_max_units: Some(900),
                vacant_parcels: None,
                total_parcels: None,
            }),
        ];
        let report = build_report(
            &location(),
            &payloads,
            generated_at(),
            &MarketAssumptions::default(),
        );

        assert_eq!(report.supply.pipeline_ratio, 0.0);
        assert_eq!(report.capacity.future_supply_ratio, 0.0);
        assert_eq!(report.capacity.market_size_multiplier, 0.0);
        assert_eq!(report.per_capita.jobs_per_unit, 0.0);
        assert_eq!(report.capacity.rezoning_likelihood, UNKNOWN);
        assert_eq!(report.submarket_name, "Des Moines");
    }

    #[test]
    fn missing_sources_fall_back_to_unknown_labels() {
        let report = build_report(&location(), &[], generated_at(), &MarketAssumptions::default());

        assert_eq!(report.data_quality.confidence_level, ConfidenceLevel::Low);
        assert_eq!(report.data_quality.sources_missing.len(), 5);
        assert_eq!(report.per_capita.affordability, UNKNOWN);
        assert_eq!(report.demand.demand_strength, UNKNOWN);
        assert_eq!(report.employment.demand_absorption_vs_future, 0.0);
    }

    #[test]
    fn rebuilding_from_same_payloads_is_byte_identical() {
        let payloads = full_payloads();
        let first = build_report(
            &location(),
            &payloads,
            generated_at(),
            &MarketAssumptions::default(),
        );
        let mut reversed = payloads.clone();
        reversed.reverse();
        let second =
            build_report(&location(), &reversed, generated_at(), &MarketAssumptions::default());

        let first_json = serde_json::to_vec(&first).expect("serializes");
        let second_json = serde_json::to_vec(&second).expect("serializes");
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn half_cent_products_round_up() {
        assert_eq!(round2(50_000.0 * 0.57 / 4000.0), 7.13);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(-2.675), -2.68);
        assert_eq!(round2(36.290_322), 36.29);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn affordability_boundaries() {
        assert_eq!(affordability(Some(24.99)), "AFFORDABLE");
        assert_eq!(affordability(Some(25.0)), "STRETCHED");
        assert_eq!(affordability(Some(34.99)), "STRETCHED");
        assert_eq!(affordability(Some(35.0)), "EXPENSIVE");
    }

    #[test]
    fn oversized_pipeline_is_high_risk_and_strong_news_is_favorable() {
        let inputs = MarketInputs {
            existing_units: 100.0,
            units_under_construction: 150.0,
            units_permitted: 50.0,
            theoretical_max_units: 200.0,
            jobs_added: 2000.0,
            ..Default::default()
        };
        let assumptions = MarketAssumptions::default();
        let capacity = market_capacity(&inputs, &assumptions);
        assert_eq!(capacity.market_size_multiplier, 4.4);
        assert_eq!(capacity.risk_level, "HIGH RISK");

        let employment = employment_impact(&inputs, &capacity, &assumptions);
        assert_eq!(employment.total_units_demand_from_news, 900.0);
        assert_eq!(employment.demand_verdict, "STRONG");
        assert_eq!(employment.supply_balance, "FAVORABLE");
    }
}
