use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::domain::{Coordinates, Location, SourceKind};
use super::sources::{HttpSourceConnector, SourceConnector, SourceError, SourcePayload};
use crate::config::SignalsConfig;

/// Result of one connector task within a single aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFetchOutcome {
    pub source: SourceKind,
    pub result: Result<SourcePayload, SourceError>,
}

impl SourceFetchOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every outcome of one fan-out, successes and failures alike.
#[derive(Debug, Clone)]
pub struct AggregationRun {
    pub point: Coordinates,
    pub outcomes: Vec<SourceFetchOutcome>,
}

impl AggregationRun {
    pub fn payloads(&self) -> Vec<SourcePayload> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok().cloned())
            .collect()
    }

    pub fn sources_available(&self) -> BTreeSet<SourceKind> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.succeeded())
            .map(|outcome| outcome.source)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("location {0} has no coordinates")]
    MissingCoordinates(String),
    #[error("location {location} has out-of-range coordinates ({lat}, {lng})")]
    InvalidCoordinates { location: String, lat: f64, lng: f64 },
}

/// Launches every connector at once and waits for all of them. No
/// connector's failure or timeout cancels its siblings.
pub struct SignalAggregator {
    connectors: Vec<Arc<dyn SourceConnector>>,
    radius_miles: f64,
    timeout: Duration,
}

impl SignalAggregator {
    pub fn new(
        connectors: Vec<Arc<dyn SourceConnector>>,
        radius_miles: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            connectors,
            radius_miles,
            timeout,
        }
    }

    /// One HTTP connector per configured source URL. Sources without a URL
    /// are simply absent and will be reported missing.
    pub fn from_config(config: &SignalsConfig) -> Result<Self, SourceError> {
        let connectors = config
            .source_urls
            .iter()
            .map(|(kind, url)| {
                HttpSourceConnector::new(*kind, url.clone())
                    .map(|connector| Arc::new(connector) as Arc<dyn SourceConnector>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            connectors,
            config.search_radius_miles,
            config.source_timeout,
        ))
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    pub async fn collect(&self, location: &Location) -> Result<AggregationRun, AggregationError> {
        let point = location
            .coordinates()
            .ok_or_else(|| AggregationError::MissingCoordinates(location.id.to_string()))?;
        if !point.is_valid() {
            return Err(AggregationError::InvalidCoordinates {
                location: location.id.to_string(),
                lat: point.lat,
                lng: point.lng,
            });
        }

        let tasks = self.connectors.iter().map(|connector| {
            let connector = Arc::clone(connector);
            async move { self.fetch_one(connector.as_ref(), point).await }
        });
        let outcomes = join_all(tasks).await;

        Ok(AggregationRun { point, outcomes })
    }

    async fn fetch_one(
        &self,
        connector: &dyn SourceConnector,
        point: Coordinates,
    ) -> SourceFetchOutcome {
        let source = connector.kind();
        let fetch = connector.fetch(point, self.radius_miles);
        let result = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(payload)) if payload.kind() != source => Err(SourceError::WrongKind {
                expected: source,
                actual: payload.kind(),
            }),
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.timeout)),
        };

        match &result {
            Ok(_) => debug!(%source, "source fetch succeeded"),
            Err(reason) => warn!(%source, %reason, "source fetch failed; marking source missing"),
        }

        SourceFetchOutcome { source, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::domain::LocationId;
    use crate::market::sources::{DemographicsPayload, RentalMarketPayload};
    use async_trait::async_trait;

    struct Fixed(SourcePayload);

    #[async_trait]
    impl SourceConnector for Fixed {
        fn kind(&self) -> SourceKind {
            self.0.kind()
        }

        async fn fetch(&self, _: Coordinates, _: f64) -> Result<SourcePayload, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct Failing(SourceKind);

    #[async_trait]
    impl SourceConnector for Failing {
        fn kind(&self) -> SourceKind {
            self.0
        }

        async fn fetch(&self, _: Coordinates, _: f64) -> Result<SourcePayload, SourceError> {
            Err(SourceError::Status(503))
        }
    }

    struct Stalled(SourceKind);

    #[async_trait]
    impl SourceConnector for Stalled {
        fn kind(&self) -> SourceKind {
            self.0
        }

        async fn fetch(&self, _: Coordinates, _: f64) -> Result<SourcePayload, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(SourceError::Transport("unreachable".to_string()))
        }
    }

    fn shared<C: SourceConnector + 'static>(connector: C) -> Arc<dyn SourceConnector> {
        Arc::new(connector)
    }

    fn location(lat: Option<f64>, lng: Option<f64>) -> Location {
        Location {
            id: LocationId("loc-1".to_string()),
            lat,
            lng,
            city: None,
            state: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn failures_and_timeouts_do_not_cancel_siblings() {
        let aggregator = SignalAggregator::new(
            vec![
                shared(Fixed(SourcePayload::RentalMarket(RentalMarketPayload::default()))),
                shared(Failing(SourceKind::PermitPipeline)),
                shared(Stalled(SourceKind::ZoningCapacity)),
                shared(Fixed(SourcePayload::Demographics(DemographicsPayload::default()))),
            ],
            3.0,
            Duration::from_millis(50),
        );

        let run = aggregator
            .collect(&location(Some(41.6), Some(-93.6)))
            .await
            .expect("aggregation succeeds with partial data");

        assert_eq!(run.outcomes.len(), 4);
        assert_eq!(
            run.sources_available(),
            BTreeSet::from([SourceKind::RentalMarket, SourceKind::Demographics])
        );
        assert_eq!(run.payloads().len(), 2);
        let zoning = run
            .outcomes
            .iter()
            .find(|outcome| outcome.source == SourceKind::ZoningCapacity)
            .expect("zoning outcome recorded");
        assert_eq!(
            zoning.result,
            Err(SourceError::Timeout(Duration::from_millis(50)))
        );
    }

    #[tokio::test]
    async fn mislabelled_payload_is_treated_as_failure() {
        struct Confused;

        #[async_trait]
        impl SourceConnector for Confused {
            fn kind(&self) -> SourceKind {
                SourceKind::EmploymentNews
            }

            async fn fetch(&self, _: Coordinates, _: f64) -> Result<SourcePayload, SourceError> {
                Ok(SourcePayload::Demographics(DemographicsPayload::default()))
            }
        }

        let aggregator = SignalAggregator::new(vec![shared(Confused)], 3.0, Duration::from_secs(1));
        let run = aggregator
            .collect(&location(Some(41.6), Some(-93.6)))
            .await
            .expect("aggregation completes");
        assert!(run.sources_available().is_empty());
    }

    #[tokio::test]
    async fn rejects_locations_without_usable_coordinates() {
        let aggregator = SignalAggregator::new(Vec::new(), 3.0, Duration::from_secs(1));

        assert!(matches!(
            aggregator.collect(&location(None, Some(-93.6))).await,
            Err(AggregationError::MissingCoordinates(_))
        ));
        assert!(matches!(
            aggregator.collect(&location(Some(123.0), Some(-93.6))).await,
            Err(AggregationError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn config_builds_one_connector_per_source_url() {
        let config = SignalsConfig {
            source_urls: vec![
                (SourceKind::RentalMarket, "https://rents.example.test/v1".to_string()),
                (SourceKind::Demographics, "https://census.example.test/v1".to_string()),
            ],
            ..SignalsConfig::default()
        };

        let aggregator = SignalAggregator::from_config(&config).expect("clients build");
        assert_eq!(aggregator.connector_count(), 2);
        assert_eq!(aggregator.timeout, config.source_timeout);
    }
}
