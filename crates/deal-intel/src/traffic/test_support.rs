use chrono::{TimeZone, Utc};

use super::domain::{PropertyId, PropertyProfile, PropertyType, RoadClass};
use crate::market::report::build_report;
use crate::market::{
    DemographicsPayload, EmploymentEvent, EmploymentNewsPayload, Location, LocationId,
    MarketAssumptions, MarketSignalReport, PermitPipelinePayload, RentalMarketPayload,
    SourcePayload, ZoningCapacityPayload,
};

pub(crate) fn profile() -> PropertyProfile {
    PropertyProfile {
        id: PropertyId("prop-ev-101".to_string()),
        location_id: LocationId("loc-des-moines-east".to_string()),
        property_type: PropertyType::Retail,
        submarket: "East Village".to_string(),
        road_class: RoadClass::Arterial,
        average_daily_traffic: Some(18_000),
        frontage_ft: 120.0,
        corner_lot: true,
        sidewalk_score: 0.8,
        signage_score: 0.6,
        entrance_score: 0.7,
        residential_units_nearby: 800,
        workers_nearby: 1200,
        transit_distance_ft: Some(600.0),
        transit_daily_ridership: Some(900),
        competitors_within_500m: 3,
        validated_weeks: 6,
    }
}

pub(crate) fn payloads() -> Vec<SourcePayload> {
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
                    company: Some("Insurer HQ".to_string()),
                    jobs_added: Some(1200),
                    ..Default::default()
                },
                EmploymentEvent {
                    company: Some("Distribution Center".to_string()),
                    jobs_removed: Some(200),
                    ..Default::default()
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

pub(crate) fn report() -> MarketSignalReport {
    let location = Location {
        id: LocationId("loc-des-moines-east".to_string()),
        lat: Some(41.59),
        lng: Some(-93.6),
        city: Some("Des Moines".to_string()),
        state: Some("IA".to_string()),
        address: None,
    };
    let generated_at = Utc
        .with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    build_report(&location, &payloads(), generated_at, &MarketAssumptions::default())
}
