use chrono::{DateTime, NaiveTime, Utc};
use std::str::FromStr;

use crate::error::ExporterError;
use crate::types::{ClusterStatus, HealthRecord};

/// Column order of a `_cat/health` line. The upstream does not label its
/// columns, so this order is the whole contract.
pub const HEALTH_FIELDS: [&str; 14] = [
    "epoch",
    "timestamp",
    "cluster",
    "status",
    "node_total",
    "node_data",
    "shards",
    "pri",
    "relo",
    "init",
    "unassign",
    "pending_tasks",
    "max_task_wait_time",
    "active_shards_percent",
];

/// Sentinel the upstream prints when no task is waiting.
pub const NO_WAIT_SENTINEL: &str = "-";

impl FromStr for ClusterStatus {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}

pub fn parse_status(s: &str) -> Result<ClusterStatus, ExporterError> {
    match s {
        "green" => Ok(ClusterStatus::Green),
        "yellow" => Ok(ClusterStatus::Yellow),
        "red" => Ok(ClusterStatus::Red),
        other => Err(ExporterError::UnmappedStatus(other.to_string())),
    }
}

/// Normalize a wait time such as `5m` or `750ms` to seconds.
pub fn parse_duration_seconds(s: &str) -> Result<f64, ExporterError> {
    let s = s.trim();
    if s == NO_WAIT_SENTINEL {
        return Ok(0.0);
    }

    // Order matters: longer suffixes first so "ms" is not taken for minutes.
    const UNITS: &[(&str, f64)] = &[
        ("nanos", 1e-9),
        ("micros", 1e-6),
        ("ms", 1e-3),
        ("s", 1.0),
        ("m", 60.0),
        ("h", 3600.0),
        ("d", 86400.0),
    ];

    for (suf, mul) in UNITS {
        if let Some(magnitude) = s.strip_suffix(suf) {
            return match magnitude.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => Ok(value * mul),
                // compound ("1h30m") or an unknown unit ending in a known letter
                Err(_) if magnitude.chars().any(|c| c.is_ascii_alphabetic()) => {
                    Err(ExporterError::UnrecognizedDurationUnit(s.to_string()))
                }
                _ => Err(non_negative_error("max_task_wait_time", magnitude)),
            };
        }
    }

    Err(ExporterError::UnrecognizedDurationUnit(s.to_string()))
}

pub fn parse_percent(s: &str) -> Result<f64, ExporterError> {
    let s = s.trim();
    let bare = s.strip_suffix('%').unwrap_or(s);
    parse_non_negative(bare, "active_shards_percent")
}

fn parse_non_negative(s: &str, field: &str) -> Result<f64, ExporterError> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(non_negative_error(field, s)),
    }
}

fn non_negative_error(field: &str, raw: &str) -> ExporterError {
    ExporterError::MalformedResponse(format!(
        "{}: expected a non-negative number, got {:?}",
        field, raw
    ))
}

/// Position of each column in [`HEALTH_FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Epoch,
    Timestamp,
    Cluster,
    Status,
    NodeTotal,
    NodeData,
    Shards,
    Pri,
    Relo,
    Init,
    Unassign,
    PendingTasks,
    MaxTaskWaitTime,
    ActiveShardsPercent,
}

impl Column {
    fn name(self) -> &'static str {
        HEALTH_FIELDS[self as usize]
    }
}

/// Tokens of one line, addressed by column.
struct Columns<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Columns<'a> {
    fn new(line: &'a str) -> Result<Self, ExporterError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != HEALTH_FIELDS.len() {
            return Err(ExporterError::MalformedResponse(format!(
                "expected {} columns, got {}",
                HEALTH_FIELDS.len(),
                tokens.len()
            )));
        }
        Ok(Self { tokens })
    }

    /// `new` guarantees one token per column.
    fn get(&self, col: Column) -> &'a str {
        self.tokens[col as usize]
    }

    fn count(&self, col: Column) -> Result<u64, ExporterError> {
        let raw = self.get(col);
        raw.parse::<u64>().map_err(|_| {
            ExporterError::MalformedResponse(format!(
                "{}: expected an integer, got {:?}",
                col.name(),
                raw
            ))
        })
    }

    fn epoch(&self) -> Result<DateTime<Utc>, ExporterError> {
        let raw = self.get(Column::Epoch);
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                ExporterError::MalformedResponse(format!("epoch: expected unix seconds, got {:?}", raw))
            })
    }

    fn timestamp(&self) -> Result<NaiveTime, ExporterError> {
        let raw = self.get(Column::Timestamp);
        NaiveTime::parse_from_str(raw, "%H:%M:%S").map_err(|_| {
            ExporterError::MalformedResponse(format!("timestamp: expected HH:MM:SS, got {:?}", raw))
        })
    }
}

/// Parse one `_cat/health` line into a typed record.
///
/// Fails on any column count other than 14 instead of shifting fields.
pub fn parse_health_line(line: &str) -> Result<HealthRecord, ExporterError> {
    let cols = Columns::new(line)?;

    Ok(HealthRecord {
        epoch: cols.epoch()?,
        timestamp: cols.timestamp()?,
        cluster: cols.get(Column::Cluster).to_string(),
        status: parse_status(cols.get(Column::Status))?,
        node_total: cols.count(Column::NodeTotal)?,
        node_data: cols.count(Column::NodeData)?,
        shards: cols.count(Column::Shards)?,
        pri: cols.count(Column::Pri)?,
        relo: cols.count(Column::Relo)?,
        init: cols.count(Column::Init)?,
        unassign: cols.count(Column::Unassign)?,
        pending_tasks: cols.count(Column::PendingTasks)?,
        max_task_wait_time: parse_duration_seconds(cols.get(Column::MaxTaskWaitTime))?,
        active_shards_percent: parse_percent(cols.get(Column::ActiveShardsPercent))?,
    })
}
