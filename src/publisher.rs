//! Prometheus gauges fed from a [`HealthRecord`].

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::ExporterError;
use crate::types::HealthRecord;

/// Label carrying the cluster name on every gauge.
pub const CLUSTER_LABEL: &str = "env";

/// The 11 cluster health gauges, all labelled by cluster name.
#[derive(Clone)]
pub struct HealthMetrics {
    pub cluster_status: GaugeVec,
    pub node_total: GaugeVec,
    pub node_data: GaugeVec,
    pub active_shards: GaugeVec,
    pub active_master_shards: GaugeVec,
    pub relo_shards: GaugeVec,
    pub init_shards: GaugeVec,
    pub unassign_shards: GaugeVec,
    pub pending_tasks: GaugeVec,
    pub max_task_wait_time: GaugeVec,
    pub active_shards_percent: GaugeVec,
}

fn cluster_gauge(name: &str, help: &str) -> Result<GaugeVec, prometheus::Error> {
    GaugeVec::new(Opts::new(name, help), &[CLUSTER_LABEL])
}

impl HealthMetrics {
    /// Creates and registers all gauges with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self {
            cluster_status: cluster_gauge(
                "es_cluster_status",
                "prod es cluster status 1:green/2:yellow/3:red gauge",
            )?,
            node_total: cluster_gauge("es_node_total", "es cluster total node nums gauge")?,
            node_data: cluster_gauge("es_node_data", "es cluster total data node nums gauge")?,
            active_shards: cluster_gauge("es_active_shards", "es cluster active shards nums gauge")?,
            active_master_shards: cluster_gauge(
                "es_active_master_shards",
                "es cluster active master shards nums gauge",
            )?,
            relo_shards: cluster_gauge("es_relo_shards", "es cluster relo shards nums gauge")?,
            init_shards: cluster_gauge("es_init_shards", "es cluster init shards nums gauge")?,
            unassign_shards: cluster_gauge(
                "es_unassign_shards",
                "es cluster unassign shards nums gauge",
            )?,
            pending_tasks: cluster_gauge("es_pending_tasks", "es cluster pending_tasks nums gauge")?,
            max_task_wait_time: cluster_gauge(
                "es_max_task_wait_time",
                "es cluster max_task_wait_time gauge",
            )?,
            active_shards_percent: cluster_gauge(
                "es_active_shards_percent",
                "es cluster active_shards_percent gauge",
            )?,
        };

        for gauge in metrics.all() {
            registry.register(Box::new(gauge.clone()))?;
        }
        Ok(metrics)
    }

    fn all(&self) -> [&GaugeVec; 11] {
        [
            &self.cluster_status,
            &self.node_total,
            &self.node_data,
            &self.active_shards,
            &self.active_master_shards,
            &self.relo_shards,
            &self.init_shards,
            &self.unassign_shards,
            &self.pending_tasks,
            &self.max_task_wait_time,
            &self.active_shards_percent,
        ]
    }

    /// Replace every gauge with the record's values.
    ///
    /// Series for any other cluster name are dropped first, so only the
    /// latest fetched cluster is ever exposed. Callers that render
    /// concurrently must serialize this with the render.
    pub fn publish(&self, record: &HealthRecord) {
        for gauge in self.all() {
            gauge.reset();
        }

        let env = [record.cluster.as_str()];

        self.cluster_status
            .with_label_values(&env)
            .set(f64::from(record.status.severity()));
        self.node_total.with_label_values(&env).set(record.node_total as f64);
        self.node_data.with_label_values(&env).set(record.node_data as f64);
        self.active_shards.with_label_values(&env).set(record.shards as f64);
        self.active_master_shards.with_label_values(&env).set(record.pri as f64);
        self.relo_shards.with_label_values(&env).set(record.relo as f64);
        self.init_shards.with_label_values(&env).set(record.init as f64);
        self.unassign_shards.with_label_values(&env).set(record.unassign as f64);
        self.pending_tasks.with_label_values(&env).set(record.pending_tasks as f64);
        self.max_task_wait_time
            .with_label_values(&env)
            .set(record.max_task_wait_time);
        self.active_shards_percent
            .with_label_values(&env)
            .set(record.active_shards_percent);
    }
}

/// Content type of the text exposition format.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Render the whole registry in the text exposition format.
pub fn render(registry: &Registry) -> Result<String, ExporterError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ExporterError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_health_line;

    fn registry_with_metrics() -> (Registry, HealthMetrics) {
        let registry = Registry::new();
        let metrics = HealthMetrics::new(&registry).unwrap();
        (registry, metrics)
    }

    #[test]
    fn test_publish_renders_all_gauges() {
        let (registry, metrics) = registry_with_metrics();
        let record =
            parse_health_line("1580486697 16:04:57 prodes green 9 3 40 20 0 0 0 0 - 100.0%").unwrap();
        metrics.publish(&record);

        let body = render(&registry).unwrap();
        for line in [
            "es_cluster_status{env=\"prodes\"} 1",
            "es_node_total{env=\"prodes\"} 9",
            "es_node_data{env=\"prodes\"} 3",
            "es_active_shards{env=\"prodes\"} 40",
            "es_active_master_shards{env=\"prodes\"} 20",
            "es_relo_shards{env=\"prodes\"} 0",
            "es_init_shards{env=\"prodes\"} 0",
            "es_unassign_shards{env=\"prodes\"} 0",
            "es_pending_tasks{env=\"prodes\"} 0",
            "es_max_task_wait_time{env=\"prodes\"} 0",
            "es_active_shards_percent{env=\"prodes\"} 100",
        ] {
            assert!(body.lines().any(|l| l == line), "missing {:?} in\n{}", line, body);
        }
        assert!(body.contains("# TYPE es_cluster_status gauge"));
    }

    #[test]
    fn test_publish_overwrites() {
        let (registry, metrics) = registry_with_metrics();

        let first =
            parse_health_line("1580486697 16:04:57 prodes red 9 3 40 20 2 1 5 3 2m 57.3%").unwrap();
        metrics.publish(&first);
        let second =
            parse_health_line("1580486757 16:05:57 prodes yellow 9 3 40 20 0 0 1 0 - 97.5%").unwrap();
        metrics.publish(&second);

        assert_eq!(metrics.cluster_status.with_label_values(&["prodes"]).get(), 2.0);
        assert_eq!(metrics.unassign_shards.with_label_values(&["prodes"]).get(), 1.0);
        assert_eq!(metrics.max_task_wait_time.with_label_values(&["prodes"]).get(), 0.0);
        assert_eq!(metrics.active_shards_percent.with_label_values(&["prodes"]).get(), 97.5);

        let body = render(&registry).unwrap();
        assert_eq!(body.matches("es_cluster_status{").count(), 1);
    }

    #[test]
    fn test_publish_drops_previous_cluster() {
        let (registry, metrics) = registry_with_metrics();

        let old =
            parse_health_line("1580486697 16:04:57 prodes red 9 3 40 20 0 0 5 0 - 80.0%").unwrap();
        metrics.publish(&old);
        let renamed =
            parse_health_line("1580486757 16:05:57 prodes2 green 9 3 40 20 0 0 0 0 - 100.0%").unwrap();
        metrics.publish(&renamed);

        let body = render(&registry).unwrap();
        assert!(!body.contains("env=\"prodes\""), "old cluster still rendered:\n{}", body);
        assert!(body.contains("es_cluster_status{env=\"prodes2\"} 1"));
        assert_eq!(body.matches("es_cluster_status{").count(), 1);
    }

    #[test]
    fn test_help_text() {
        let (registry, metrics) = registry_with_metrics();
        let record =
            parse_health_line("1580486697 16:04:57 prodes green 9 3 40 20 0 0 0 0 - 100.0%").unwrap();
        metrics.publish(&record);

        let body = render(&registry).unwrap();
        assert!(body.contains("# HELP es_cluster_status prod es cluster status 1:green/2:yellow/3:red gauge"));
        assert!(body.contains("# HELP es_max_task_wait_time es cluster max_task_wait_time gauge"));
        assert!(body.contains("# HELP es_node_total es cluster total node nums gauge"));
    }

    #[test]
    fn test_empty_registry_renders_nothing() {
        let (registry, _metrics) = registry_with_metrics();
        // Vecs without children produce no samples
        assert_eq!(render(&registry).unwrap(), "");
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        HealthMetrics::new(&registry).unwrap();
        assert!(HealthMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_content_type() {
        assert!(content_type().starts_with("text/plain"));
    }
}
