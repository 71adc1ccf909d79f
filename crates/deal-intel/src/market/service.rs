use chrono::Utc;
use std::sync::Arc;
use tracing::{info, Instrument};

use super::aggregation::{AggregationError, SignalAggregator};
use super::cache::{CacheError, ReportCache};
use super::domain::{Location, MarketAssumptions};
use super::report::{build_report, MarketSignalReport};
use super::sources::SourceError;
use crate::config::AppConfig;
use crate::telemetry;

/// Freshness window used by [`MarketSignalService::report_for`] unless
/// overridden.
pub const DEFAULT_REPORT_MAX_AGE_HOURS: i64 = 24;

/// Composes the aggregator, report builder, and cache. Constructed once per
/// process and shared by reference.
pub struct MarketSignalService<C> {
    aggregator: SignalAggregator,
    cache: Arc<C>,
    assumptions: MarketAssumptions,
    max_age_hours: i64,
}

impl<C> MarketSignalService<C>
where
    C: ReportCache + 'static,
{
    pub fn new(
        aggregator: SignalAggregator,
        cache: Arc<C>,
        assumptions: MarketAssumptions,
    ) -> Self {
        Self {
            aggregator,
            cache,
            assumptions,
            max_age_hours: DEFAULT_REPORT_MAX_AGE_HOURS,
        }
    }

    /// HTTP connectors, multipliers, and freshness window all taken from
    /// `config`.
    pub fn from_config(config: &AppConfig, cache: Arc<C>) -> Result<Self, MarketSignalError> {
        let aggregator = SignalAggregator::from_config(&config.signals)?;
        Ok(Self::new(aggregator, cache, config.assumptions)
            .with_max_age_hours(config.signals.report_max_age_hours))
    }

    pub fn with_max_age_hours(mut self, max_age_hours: i64) -> Self {
        self.max_age_hours = max_age_hours;
        self
    }

    pub fn max_age_hours(&self) -> i64 {
        self.max_age_hours
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Fetch every source, build a fresh report, and upsert it.
    pub async fn generate(
        &self,
        location: &Location,
    ) -> Result<MarketSignalReport, MarketSignalError> {
        let span = telemetry::market_pipeline_span(&location.id);
        async {
            let run = self.aggregator.collect(location).await?;
            let payloads = run.payloads();
            let report = build_report(location, &payloads, Utc::now(), &self.assumptions);

            self.cache.put(&report)?;

            info!(
                submarket = %report.submarket_name,
                available = report.data_quality.sources_available.len(),
                missing = report.data_quality.sources_missing.len(),
                confidence = report.confidence_level().label(),
                "market signal report generated"
            );

            Ok::<_, MarketSignalError>(report)
        }
        .instrument(span)
        .await
    }

    /// Cached report within the configured freshness window, otherwise a
    /// regenerated one.
    pub async fn report_for(
        &self,
        location: &Location,
    ) -> Result<MarketSignalReport, MarketSignalError> {
        self.report_within(location, self.max_age_hours).await
    }

    /// Same as [`report_for`](Self::report_for) with an explicit window.
    pub async fn report_within(
        &self,
        location: &Location,
        max_age_hours: i64,
    ) -> Result<MarketSignalReport, MarketSignalError> {
        if let Some(report) = self.cache.get(&location.id, max_age_hours)? {
            return Ok(report);
        }
        self.generate(location).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MarketSignalError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("source connector could not be built: {0}")]
    Connector(#[from] SourceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::cache::InMemoryReportCache;
    use crate::market::domain::{ConfidenceLevel, Coordinates, LocationId, SourceKind};
    use crate::config::{AppEnvironment, SignalsConfig, TelemetryConfig};
    use crate::market::sources::{SourceConnector, SourcePayload, ZoningCapacityPayload};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingZoning(Arc<AtomicUsize>);

    #[async_trait]
    impl SourceConnector for CountingZoning {
        fn kind(&self) -> SourceKind {
            SourceKind::ZoningCapacity
        }

        async fn fetch(&self, _: Coordinates, _: f64) -> Result<SourcePayload, SourceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(SourcePayload::ZoningCapacity(ZoningCapacityPayload::default()))
        }
    }

    fn service(calls: Arc<AtomicUsize>) -> MarketSignalService<InMemoryReportCache> {
        let connectors: Vec<Arc<dyn SourceConnector>> = vec![Arc::new(CountingZoning(calls))];
        let aggregator = SignalAggregator::new(connectors, 3.0, std::time::Duration::from_secs(1));
        MarketSignalService::new(
            aggregator,
            Arc::new(InMemoryReportCache::new()),
            MarketAssumptions::default(),
        )
    }

    fn location() -> Location {
        Location {
            id: LocationId("loc-urbandale".to_string()),
            lat: Some(41.63),
            lng: Some(-93.71),
            city: Some("Urbandale".to_string()),
            state: Some("IA".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn fresh_cache_entry_short_circuits_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let generated = service.generate(&location()).await.expect("generates");
        assert_eq!(generated.confidence_level(), ConfidenceLevel::Low);

        let served = service.report_for(&location()).await.expect("serves");
        assert_eq!(served, generated);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_cache_entry_forces_regeneration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());

        let mut old = service.generate(&location()).await.expect("generates");
        old.generated_at = old.generated_at - Duration::hours(10);
        service.cache().put(&old).expect("backdate");

        let served = service
            .report_within(&location(), 2)
            .await
            .expect("regenerates");
        assert!(served.generated_at > old.generated_at);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn configured_window_decides_freshness() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone()).with_max_age_hours(12);
        assert_eq!(service.max_age_hours(), 12);

        let mut old = service.generate(&location()).await.expect("generates");
        old.generated_at = old.generated_at - Duration::hours(10);
        service.cache().put(&old).expect("backdate");
        let served = service.report_for(&location()).await.expect("serves");
        assert_eq!(served.generated_at, old.generated_at);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        old.generated_at = old.generated_at - Duration::hours(5);
        service.cache().put(&old).expect("backdate further");
        let served = service.report_for(&location()).await.expect("regenerates");
        assert!(served.generated_at > old.generated_at);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn from_config_applies_window_and_multipliers() {
        let config = AppConfig {
            environment: AppEnvironment::Test,
            signals: SignalsConfig {
                report_max_age_hours: 6,
                source_urls: vec![(
                    SourceKind::PermitPipeline,
                    "https://permits.example.test/v2".to_string(),
                )],
                ..SignalsConfig::default()
            },
            assumptions: MarketAssumptions {
                jobs_to_units: 0.5,
                ..MarketAssumptions::default()
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        };

        let cache = Arc::new(InMemoryReportCache::new());
        let service = MarketSignalService::from_config(&config, cache).expect("clients build");
        assert_eq!(service.max_age_hours(), 6);
        assert_eq!(service.assumptions.jobs_to_units, 0.5);
        assert_eq!(service.aggregator.connector_count(), 1);
    }

    #[tokio::test]
    async fn missing_coordinates_reject_without_touching_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(calls.clone());
        let mut location = location();
        location.lat = None;

        assert!(matches!(
            service.generate(&location).await,
            Err(MarketSignalError::Aggregation(AggregationError::MissingCoordinates(_)))
        ));
        assert!(service.cache().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
