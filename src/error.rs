//! Errors raised while scraping the health endpoint.

use thiserror::Error;

/// Everything that can abort a single scrape.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Transport-level failure talking to the health endpoint.
    #[error("health endpoint unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The health endpoint answered with a non-success status.
    #[error("health endpoint returned status {status}")]
    UpstreamAuthFailure { status: u16 },

    /// Wrong token count or a field that does not parse.
    #[error("malformed health response: {0}")]
    MalformedResponse(String),

    #[error("unmapped cluster status: {0:?}")]
    UnmappedStatus(String),

    #[error("unrecognized duration unit in {0:?}")]
    UnrecognizedDurationUnit(String),

    /// Registry could not be rendered.
    #[error("failed to encode metrics: {0}")]
    Encode(String),
}

impl ExporterError {
    /// True when the failure came from the upstream rather than its payload.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ExporterError::UpstreamUnreachable(_) | ExporterError::UpstreamAuthFailure { .. }
        )
    }
}

/// Transport failures only; non-2xx statuses are mapped by the fetcher.
impl From<reqwest::Error> for ExporterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExporterError::UpstreamUnreachable(format!("request timed out: {}", err))
        } else {
            ExporterError::UpstreamUnreachable(err.to_string())
        }
    }
}

impl From<prometheus::Error> for ExporterError {
    fn from(err: prometheus::Error) -> Self {
        ExporterError::Encode(err.to_string())
    }
}
