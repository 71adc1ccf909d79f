//! In-memory adapters for every storage and lookup trait. Used by tests and
//! by embedders that have not wired real persistence yet.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::market::Coordinates;
use crate::repository::RepositoryError;
use crate::traffic::{
    CalibrationFactor, CalibrationStore, PredictionRepository, PredictionWeek, PropertyId,
    PropertyProfile, PropertyRepository, TrafficPrediction,
};
use crate::triage::{
    Deal, DealId, DealRepository, Geocoder, LookupError, TradeArea, TradeAreaResolver,
    TriageRepository, TriageResult,
};

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

#[derive(Default, Clone)]
pub struct InMemoryPropertyRepository {
    records: Arc<Mutex<HashMap<PropertyId, PropertyProfile>>>,
}

impl InMemoryPropertyRepository {
    pub fn insert(&self, profile: PropertyProfile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(profile.id.clone(), profile);
        Ok(())
    }
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertyProfile>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCalibrationStore {
    factors: Arc<Mutex<Vec<CalibrationFactor>>>,
}

impl InMemoryCalibrationStore {
    /// Replaces the stored factor set, as the validation workflow would.
    pub fn replace(&self, factors: Vec<CalibrationFactor>) -> Result<(), RepositoryError> {
        let mut guard = self.factors.lock().map_err(poisoned)?;
        *guard = factors;
        Ok(())
    }
}

impl CalibrationStore for InMemoryCalibrationStore {
    fn factors(&self) -> Result<Vec<CalibrationFactor>, RepositoryError> {
        Ok(self.factors.lock().map_err(poisoned)?.clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPredictionRepository {
    records: Arc<Mutex<HashMap<(PropertyId, PredictionWeek), TrafficPrediction>>>,
}

impl InMemoryPredictionRepository {
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl PredictionRepository for InMemoryPredictionRepository {
    fn upsert(&self, prediction: TrafficPrediction) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert((prediction.property_id.clone(), prediction.week), prediction);
        Ok(())
    }

    fn fetch(
        &self,
        property_id: &PropertyId,
        week: PredictionWeek,
    ) -> Result<Option<TrafficPrediction>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(&(property_id.clone(), week)).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDealRepository {
    records: Arc<Mutex<HashMap<DealId, Deal>>>,
}

impl InMemoryDealRepository {
    pub fn insert(&self, deal: Deal) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(deal.id.clone(), deal);
        Ok(())
    }
}

impl DealRepository for InMemoryDealRepository {
    fn fetch(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryTriageRepository {
    records: Arc<Mutex<HashMap<DealId, TriageResult>>>,
}

impl TriageRepository for InMemoryTriageRepository {
    fn upsert(&self, result: TriageResult) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(result.deal_id.clone(), result);
        Ok(())
    }

    fn fetch(&self, id: &DealId) -> Result<Option<TriageResult>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

/// Geocoder answering from a fixed address table.
#[derive(Default, Clone)]
pub struct StaticGeocoder {
    entries: Arc<Mutex<HashMap<String, Coordinates>>>,
}

impl StaticGeocoder {
    pub fn with_entry(self, query: &str, point: Coordinates) -> Self {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(query.to_ascii_lowercase(), point);
        }
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, LookupError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| LookupError::Unavailable("geocoder table poisoned".to_string()))?;
        Ok(guard.get(&query.to_ascii_lowercase()).copied())
    }
}

/// Resolver returning the trade area whose cell contains the point. Cells
/// are matched by rounding coordinates to two decimals.
#[derive(Default, Clone)]
pub struct StaticTradeAreaResolver {
    cells: Arc<Mutex<HashMap<(i64, i64), TradeArea>>>,
}

impl StaticTradeAreaResolver {
    pub fn with_area(self, point: Coordinates, area: TradeArea) -> Self {
        if let Ok(mut guard) = self.cells.lock() {
            guard.insert(Self::cell(point), area);
        }
        self
    }

    fn cell(point: Coordinates) -> (i64, i64) {
        ((point.lat * 100.0).round() as i64, (point.lng * 100.0).round() as i64)
    }
}

#[async_trait]
impl TradeAreaResolver for StaticTradeAreaResolver {
    async fn resolve(&self, point: Coordinates) -> Result<Option<TradeArea>, LookupError> {
        let guard = self
            .cells
            .lock()
            .map_err(|_| LookupError::Unavailable("trade area table poisoned".to_string()))?;
        Ok(guard.get(&Self::cell(point)).cloned())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn poisoned_prediction_store_reports_unavailable() {
        let repository = InMemoryPredictionRepository::default();
        assert_eq!(repository.len().expect("fresh store"), 0);

        let records = Arc::clone(&repository.records);
        let _ = thread::spawn(move || {
            let _guard = records.lock().expect("lock acquired");
            panic!("writer crashed while holding the lock");
        })
        .join();

        assert!(matches!(repository.len(), Err(RepositoryError::Unavailable(_))));
        assert!(repository.is_empty().is_err());
    }
}
