use std::sync::{Arc, Mutex};

use prometheus::Registry;
use tracing::{error, info};

use crate::error::ExporterError;
use crate::fetcher::HealthFetcher;
use crate::publisher::{render, HealthMetrics};
use crate::types::UpstreamConfig;

/// Runs one fetch, publish and render cycle per scrape.
///
/// Holds the registry for the lifetime of the process; nothing else
/// survives between scrapes.
#[derive(Clone)]
pub struct HealthCollector {
    fetcher: HealthFetcher,
    metrics: HealthMetrics,
    registry: Registry,
    /// Serializes reset, set and render so no scrape sees a half-published registry.
    publish_lock: Arc<Mutex<()>>,
}

impl HealthCollector {
    pub fn new(fetcher: HealthFetcher, registry: Registry) -> Result<Self, ExporterError> {
        let metrics = HealthMetrics::new(&registry)?;
        Ok(Self {
            fetcher,
            metrics,
            registry,
            publish_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ExporterError> {
        Self::new(HealthFetcher::new(config)?, Registry::new())
    }

    pub fn metrics(&self) -> &HealthMetrics {
        &self.metrics
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Fetch the current health line and return the rendered registry.
    ///
    /// Gauges are only written after the whole line parsed, so a failed
    /// scrape leaves the previous values untouched.
    pub async fn scrape(&self) -> Result<String, ExporterError> {
        let record = match self.fetcher.fetch().await {
            Ok(record) => record,
            Err(e) => {
                error!("scrape failed: {}", e);
                return Err(e);
            }
        };

        info!(
            cluster = %record.cluster,
            status = %record.status,
            nodes = record.node_total,
            unassigned = record.unassign,
            "cluster health fetched"
        );
        let _guard = self
            .publish_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.metrics.publish(&record);
        render(&self.registry)
    }
}
