//! The fixed machine-metric catalogue.
//!
//! Machine health charts don't go through the classifier: the node
//! exporter's names are stable, so each chart is a hand-written PromQL
//! expression with a known value type.

use super::CLUSTER_LABEL;
use crate::datamodel::ValueType;
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

/// Which machine dashboard panel a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricScene {
    Cpu,
    Memory,
    Load,
    Disk,
    Network,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MachineMetric {
    pub name: &'static str,
    pub scene: MetricScene,
    pub value_type: ValueType,
    /// The range-query expression, before cluster scoping.
    pub query: &'static str,
}

pub const MACHINE_METRICS: &[MachineMetric] = &[
    MachineMetric {
        name: "cpu_utilization",
        scene: MetricScene::Cpu,
        value_type: ValueType::Percentage,
        query: r#"(1 - avg by (instance) (rate(node_cpu_seconds_total{mode="idle"}[5m]))) * 100"#,
    },
    MachineMetric {
        name: "memory_utilization",
        scene: MetricScene::Memory,
        value_type: ValueType::Percentage,
        query: "(1 - node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes) * 100",
    },
    MachineMetric {
        name: "memory_used",
        scene: MetricScene::Memory,
        value_type: ValueType::Byte,
        query: "node_memory_MemTotal_bytes - node_memory_MemAvailable_bytes",
    },
    MachineMetric {
        name: "load_1m",
        scene: MetricScene::Load,
        value_type: ValueType::Number,
        query: "node_load1",
    },
    MachineMetric {
        name: "load_5m",
        scene: MetricScene::Load,
        value_type: ValueType::Number,
        query: "node_load5",
    },
    MachineMetric {
        name: "load_15m",
        scene: MetricScene::Load,
        value_type: ValueType::Number,
        query: "node_load15",
    },
    MachineMetric {
        name: "disk_used",
        scene: MetricScene::Disk,
        value_type: ValueType::Byte,
        query: r#"node_filesystem_size_bytes{fstype!~"tmpfs|overlay"} - node_filesystem_avail_bytes{fstype!~"tmpfs|overlay"}"#,
    },
    MachineMetric {
        name: "disk_read_rate",
        scene: MetricScene::Disk,
        value_type: ValueType::ByteSecond,
        query: "rate(node_disk_read_bytes_total[5m])",
    },
    MachineMetric {
        name: "disk_write_rate",
        scene: MetricScene::Disk,
        value_type: ValueType::ByteSecond,
        query: "rate(node_disk_written_bytes_total[5m])",
    },
    MachineMetric {
        name: "disk_read_iops",
        scene: MetricScene::Disk,
        value_type: ValueType::DiskIoNet,
        query: "rate(node_disk_reads_completed_total[5m])",
    },
    MachineMetric {
        name: "disk_write_iops",
        scene: MetricScene::Disk,
        value_type: ValueType::DiskIoNet,
        query: "rate(node_disk_writes_completed_total[5m])",
    },
    MachineMetric {
        name: "network_in_rate",
        scene: MetricScene::Network,
        value_type: ValueType::ByteSecondNet,
        query: r#"rate(node_network_receive_bytes_total{device!="lo"}[5m])"#,
    },
    MachineMetric {
        name: "network_out_rate",
        scene: MetricScene::Network,
        value_type: ValueType::ByteSecondNet,
        query: r#"rate(node_network_transmit_bytes_total{device!="lo"}[5m])"#,
    },
];

pub fn find(name: &str) -> Option<&'static MachineMetric> {
    MACHINE_METRICS.iter().find(|m| m.name == name)
}

/// Scope a catalogue expression to one cluster by appending the cluster
/// label to every node-exporter selector in it. Without a cluster id the
/// expression passes through unchanged.
pub fn scoped_query(query: &str, cluster_id: Option<&str>) -> String {
    let Some(cluster) = cluster_id else {
        return query.to_string();
    };
    static SELECTOR_RE: OnceLock<Regex> = OnceLock::new();
    let re = SELECTOR_RE.get_or_init(|| {
        Regex::new(r"(node_[A-Za-z0-9_]+)(\{([^}]*)\})?").expect("static regex must parse")
    });
    re.replace_all(query, |caps: &Captures| {
        let name = &caps[1];
        match caps.get(3) {
            Some(labels) => format!(
                "{name}{{{},{CLUSTER_LABEL}=\"{cluster}\"}}",
                labels.as_str()
            ),
            None => format!("{name}{{{CLUSTER_LABEL}=\"{cluster}\"}}"),
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        assert_eq!(find("cpu_utilization").unwrap().value_type, ValueType::Percentage);
        assert!(find("gpu_utilization").is_none());
    }

    #[test]
    fn test_scoped_query_labels_every_selector() {
        let cpu = find("cpu_utilization").unwrap();
        assert_eq!(
            scoped_query(cpu.query, Some("7")),
            r#"(1 - avg by (instance) (rate(node_cpu_seconds_total{mode="idle",nebula_cluster="7"}[5m]))) * 100"#
        );
        // Bare metric names get a fresh selector.
        assert_eq!(
            scoped_query("node_load1", Some("7")),
            r#"node_load1{nebula_cluster="7"}"#
        );
        // Both operands of an expression are scoped.
        let memory = find("memory_used").unwrap();
        assert_eq!(
            scoped_query(memory.query, Some("7")),
            r#"node_memory_MemTotal_bytes{nebula_cluster="7"} - node_memory_MemAvailable_bytes{nebula_cluster="7"}"#
        );
    }

    #[test]
    fn test_scoped_query_without_cluster_passes_through() {
        for metric in MACHINE_METRICS {
            assert_eq!(scoped_query(metric.query, None), metric.query);
        }
    }

    #[test]
    fn test_names_unique() {
        for (i, metric) in MACHINE_METRICS.iter().enumerate() {
            assert!(
                !MACHINE_METRICS[i + 1..].iter().any(|m| m.name == metric.name),
                "duplicate machine metric {}",
                metric.name
            );
        }
    }
}
