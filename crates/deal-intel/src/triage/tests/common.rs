use std::sync::Arc;

use crate::infra::{
    InMemoryDealRepository, InMemoryTriageRepository, StaticGeocoder, StaticTradeAreaResolver,
};
use crate::market::Coordinates;
use crate::triage::domain::{Deal, DealId, PropertySignals, TradeArea};
use crate::triage::{DealTriageService, Geocoder, TradeAreaResolver};

pub(super) const EAST_VILLAGE: Coordinates = Coordinates {
    lat: 41.5868,
    lng: -93.6250,
};

pub(super) fn strong_trade_area() -> TradeArea {
    TradeArea {
        id: "ta-des-moines-east".to_string(),
        market_strength: 0.8,
        location_quality: 0.8,
        rent_growth_pct: 6.5,
        population_growth_pct: 6.2,
        job_growth_pct: 7.1,
        properties: PropertySignals {
            property_count: 60,
            avg_rent: 2600.0,
            avg_occupancy: 0.97,
            quality_score: 0.90,
        },
    }
}

pub(super) fn soft_trade_area() -> TradeArea {
    TradeArea {
        id: "ta-rural-fringe".to_string(),
        market_strength: 0.3,
        location_quality: 0.2,
        rent_growth_pct: 0.5,
        population_growth_pct: -0.8,
        job_growth_pct: 0.2,
        properties: PropertySignals {
            property_count: 4,
            avg_rent: 950.0,
            avg_occupancy: 0.84,
            quality_score: 0.4,
        },
    }
}

pub(super) fn deal(id: &str) -> Deal {
    Deal {
        id: DealId(id.to_string()),
        name: "East Village Mixed Use".to_string(),
        address: Some("400 E Locust St".to_string()),
        city: Some("Des Moines".to_string()),
        state: Some("IA".to_string()),
        boundary_centroid: None,
    }
}

pub(super) const DEAL_QUERY: &str = "400 E Locust St, Des Moines, IA";

pub(super) struct Harness {
    pub deals: InMemoryDealRepository,
    pub results: InMemoryTriageRepository,
    pub service: Arc<DealTriageService>,
}

pub(super) fn harness(
    geocoder: Arc<dyn Geocoder>,
    trade_areas: Arc<dyn TradeAreaResolver>,
) -> Harness {
    let deals = InMemoryDealRepository::default();
    let results = InMemoryTriageRepository::default();
    let service = Arc::new(DealTriageService::new(
        Arc::new(deals.clone()),
        geocoder,
        trade_areas,
        Arc::new(results.clone()),
    ));
    Harness {
        deals,
        results,
        service,
    }
}

pub(super) fn resolvable_harness() -> Harness {
    harness(
        Arc::new(StaticGeocoder::default().with_entry(DEAL_QUERY, EAST_VILLAGE)),
        Arc::new(StaticTradeAreaResolver::default().with_area(EAST_VILLAGE, strong_trade_area())),
    )
}
