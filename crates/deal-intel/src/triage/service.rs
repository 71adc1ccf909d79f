use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

use super::domain::{Deal, DealId, TradeArea, TriageResult};
use super::scoring;
use crate::market::Coordinates;
use crate::repository::RepositoryError;
use crate::telemetry;

pub trait DealRepository: Send + Sync {
    fn fetch(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError>;
}

pub trait TriageRepository: Send + Sync {
    fn upsert(&self, result: TriageResult) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DealId) -> Result<Option<TriageResult>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, LookupError>;
}

/// Geographic resolution collaborator: point to trade area and its signals.
#[async_trait]
pub trait TradeAreaResolver: Send + Sync {
    async fn resolve(&self, point: Coordinates) -> Result<Option<TradeArea>, LookupError>;
}

pub struct DealTriageService {
    deals: Arc<dyn DealRepository>,
    geocoder: Arc<dyn Geocoder>,
    trade_areas: Arc<dyn TradeAreaResolver>,
    results: Arc<dyn TriageRepository>,
}

impl DealTriageService {
    pub fn new(
        deals: Arc<dyn DealRepository>,
        geocoder: Arc<dyn Geocoder>,
        trade_areas: Arc<dyn TradeAreaResolver>,
        results: Arc<dyn TriageRepository>,
    ) -> Self {
        Self {
            deals,
            geocoder,
            trade_areas,
            results,
        }
    }

    /// Score a deal and persist the result, replacing any earlier triage.
    /// Only a missing deal is fatal; lookup failures degrade to neutral scores.
    pub async fn triage(&self, deal_id: &DealId) -> Result<TriageResult, TriageError> {
        self.score_and_store(deal_id)
            .instrument(telemetry::deal_triage_span(deal_id))
            .await
    }

    async fn score_and_store(&self, deal_id: &DealId) -> Result<TriageResult, TriageError> {
        let deal = self
            .deals
            .fetch(deal_id)?
            .ok_or_else(|| TriageError::DealNotFound(deal_id.to_string()))?;

        let coordinates = self.resolve_coordinates(&deal).await;
        let trade_area = match coordinates {
            Some(point) => self.resolve_trade_area(point).await,
            None => None,
        };
        let trade_area = trade_area.as_ref();

        let scores = scoring::score(trade_area);
        let status = scoring::classify(scores.total);
        let result = TriageResult {
            deal_id: deal.id.clone(),
            status,
            strategies: scoring::strategies(trade_area),
            risks: scoring::risks(trade_area),
            recommendations: scoring::recommendations(status, trade_area),
            trade_area_id: trade_area.map(|area| area.id.clone()),
            coordinates,
            scores,
            triaged_at: Utc::now(),
        };

        self.results.upsert(result.clone())?;

        info!(
            score = result.scores.total,
            status = result.status.label(),
            trade_area = result.trade_area_id.as_deref().unwrap_or("none"),
            "deal triaged"
        );

        Ok(result)
    }

    /// Fire-and-forget triage after deal creation. Failures are logged and
    /// never reach the caller.
    pub fn spawn_auto_triage(self: &Arc<Self>, deal_id: DealId) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service.triage(&deal_id).await {
                error!(deal = %deal_id, error = %err, "automatic triage failed");
            }
        })
    }

    async fn resolve_coordinates(&self, deal: &Deal) -> Option<Coordinates> {
        if let Some(centroid) = deal.boundary_centroid.filter(Coordinates::is_valid) {
            return Some(centroid);
        }

        let query = deal.geocoding_query()?;
        match self.geocoder.geocode(&query).await {
            Ok(Some(point)) if point.is_valid() => Some(point),
            Ok(_) => {
                warn!("geocoder returned no usable coordinates");
                None
            }
            Err(err) => {
                warn!(error = %err, "geocoding failed; scoring with neutral defaults");
                None
            }
        }
    }

    async fn resolve_trade_area(&self, point: Coordinates) -> Option<TradeArea> {
        match self.trade_areas.resolve(point).await {
            Ok(area) => area,
            Err(err) => {
                warn!(error = %err, "trade area lookup failed; scoring with neutral defaults");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("deal {0} not found")]
    DealNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
