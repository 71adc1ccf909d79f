use std::collections::BTreeSet;

use super::sources::{
    DemographicsPayload, EmploymentNewsPayload, PermitPipelinePayload, RentalMarketPayload,
    SourcePayload, ZoningCapacityPayload,
};

/// Every source field with its neutral default already applied. Values that
/// have no neutral number (income, occupancy, rent) stay optional so the
/// builder can label them UNKNOWN instead of inventing a figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketInputs {
    pub submarket_name: Option<String>,
    pub existing_units: f64,
    pub avg_rent: Option<f64>,
    pub avg_occupancy: Option<f64>,
    pub properties_in_market: f64,
    pub properties_with_concessions: f64,

    pub population: f64,
    pub households: f64,
    pub median_income: Option<f64>,
    pub population_growth_pct: Option<f64>,

    pub employment_events: usize,
    pub jobs_added: f64,
    pub jobs_removed: f64,

    pub units_under_construction: f64,
    pub units_permitted: f64,
    pub active_projects: u32,

    pub theoretical_max_units: f64,
    pub vacant_parcels: f64,
    pub total_parcels: f64,
}

impl MarketInputs {
    /// Folds whatever payloads arrived into one normalized view. Order does
    /// not matter; a later payload of the same kind replaces the earlier one.
    pub fn from_payloads<'a, I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = &'a SourcePayload>,
    {
        let mut inputs = Self::default();
        for payload in payloads {
            match payload {
                SourcePayload::RentalMarket(rental) => inputs.apply_rental(rental),
                SourcePayload::Demographics(demo) => inputs.apply_demographics(demo),
                SourcePayload::EmploymentNews(news) => inputs.apply_employment(news),
                SourcePayload::PermitPipeline(permits) => inputs.apply_permits(permits),
                SourcePayload::ZoningCapacity(zoning) => inputs.apply_zoning(zoning),
            }
        }
        inputs
    }

    fn apply_rental(&mut self, rental: &RentalMarketPayload) {
        self.submarket_name = rental
            .submarket_name
            .as_ref()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.existing_units = rental.existing_units.unwrap_or(0) as f64;
        self.avg_rent = positive(rental.avg_rent);
        self.avg_occupancy = rental
            .avg_occupancy
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| if value > 1.0 { value / 100.0 } else { value })
            .map(|value| value.clamp(0.0, 1.0));
        self.properties_in_market = rental.properties_in_market.unwrap_or(0) as f64;
        self.properties_with_concessions = rental.properties_with_concessions.unwrap_or(0) as f64;
    }

    fn apply_demographics(&mut self, demo: &DemographicsPayload) {
        self.population = demo.population.unwrap_or(0) as f64;
        self.households = demo.households.unwrap_or(0) as f64;
        self.median_income = positive(demo.median_household_income);
        self.population_growth_pct = demo.population_growth_pct.filter(|value| value.is_finite());
    }

    fn apply_employment(&mut self, news: &EmploymentNewsPayload) {
        self.employment_events = news.events.len();
        self.jobs_added = news
            .events
            .iter()
            .map(|event| event.jobs_added.unwrap_or(0).max(0) as f64)
            .sum();
        self.jobs_removed = news
            .events
            .iter()
            .map(|event| event.jobs_removed.unwrap_or(0).max(0) as f64)
            .sum();
    }

    fn apply_permits(&mut self, permits: &PermitPipelinePayload) {
        self.units_under_construction = permits.units_under_construction.unwrap_or(0) as f64;
        self.units_permitted = permits.units_permitted.unwrap_or(0) as f64;
        self.active_projects = permits.active_projects.unwrap_or(0);
    }

    fn apply_zoning(&mut self, zoning: &ZoningCapacityPayload) {
        self.theoretical_max_units = zoning.theoretical_max_units.unwrap_or(0) as f64;
        self.vacant_parcels = zoning.vacant_parcels.unwrap_or(0) as f64;
        self.total_parcels = zoning.total_parcels.unwrap_or(0) as f64;
    }

    pub fn pipeline_units(&self) -> f64 {
        self.units_under_construction + self.units_permitted
    }

    pub fn net_jobs(&self) -> f64 {
        self.jobs_added - self.jobs_removed
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

/// Kinds present in a payload set, ordered for stable serialization.
pub(crate) fn kinds_present<'a, I>(payloads: I) -> BTreeSet<super::domain::SourceKind>
where
    I: IntoIterator<Item = &'a SourcePayload>,
{
    payloads.into_iter().map(SourcePayload::kind).collect()
}
