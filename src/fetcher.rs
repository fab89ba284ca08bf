use reqwest::Client;
use tracing::{debug, warn};

use crate::error::ExporterError;
use crate::parsing::parse_health_line;
use crate::types::{HealthRecord, UpstreamConfig};

/// Pulls one `_cat/health` line from the upstream per call.
#[derive(Debug, Clone)]
pub struct HealthFetcher {
    client: Client,
    config: UpstreamConfig,
}

impl HealthFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ExporterError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExporterError::UpstreamUnreachable(format!("build http client: {}", e)))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// GET the health endpoint and return the raw body.
    pub async fn fetch_raw(&self) -> Result<String, ExporterError> {
        let mut req = self.client.get(&self.config.health_url);
        if let Some(user) = &self.config.username {
            req = req.basic_auth(user, self.config.password.as_ref());
        }

        let res = req.send().await.map_err(|e| {
            warn!("health endpoint {} unreachable: {}", self.config.health_url, e);
            ExporterError::from(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!("health endpoint returned {}: {}", status, body.trim());
            return Err(ExporterError::UpstreamAuthFailure {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        debug!("health line: {}", body.trim());
        Ok(body)
    }

    /// Fetch and parse in one step.
    pub async fn fetch(&self) -> Result<HealthRecord, ExporterError> {
        let body = self.fetch_raw().await?;
        parse_health_line(&body)
    }
}
