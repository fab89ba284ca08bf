use chrono::{DateTime, NaiveTime, Utc};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub upstream: UpstreamConfig,
}

/// Where and how to reach the `_cat/health` endpoint.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub health_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("health_url", &self.health_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterStatus {
    Green,
    Yellow,
    Red,
}

impl ClusterStatus {
    /// Numeric severity published on `es_cluster_status`.
    pub fn severity(self) -> u8 {
        match self {
            ClusterStatus::Green => 1,
            ClusterStatus::Yellow => 2,
            ClusterStatus::Red => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::Green => "green",
            ClusterStatus::Yellow => "yellow",
            ClusterStatus::Red => "red",
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed `_cat/health` line. Lives for a single scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub epoch: DateTime<Utc>,
    pub timestamp: NaiveTime,
    pub cluster: String,
    pub status: ClusterStatus,
    pub node_total: u64,
    pub node_data: u64,
    pub shards: u64,
    pub pri: u64,
    pub relo: u64,
    pub init: u64,
    pub unassign: u64,
    pub pending_tasks: u64,
    /// Normalized to seconds.
    pub max_task_wait_time: f64,
    pub active_shards_percent: f64,
}
