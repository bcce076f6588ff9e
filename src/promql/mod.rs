//! PromQL text composition.
//!
//! The backend evaluates query strings verbatim, so every expression here
//! must reproduce its grammar exactly. Nothing is validated locally; a
//! malformed expression comes back from the backend as an empty or
//! erroring result and the caller degrades to an empty chart.

pub mod machine;

use crate::datamodel::{AggregationKind, MetricDescriptor, QueryPeriod, ServiceKind};

/// Label carrying the cluster id on every scraped series.
pub const CLUSTER_LABEL: &str = "nebula_cluster";

/// Window for rate() and quantile-over-rate expressions.
const RATE_WINDOW: &str = "5s";

/// Window for the process CPU rate, which is charted as a percentage.
const CPU_RATE_WINDOW: &str = "5m";

/// The flat identifier a component exports for a metric, aggregation and
/// stats period. Raw metrics carry no suffix at all.
pub fn compose_query(
    descriptor: &MetricDescriptor,
    aggregation: AggregationKind,
    period: QueryPeriod,
) -> String {
    if descriptor.is_raw {
        descriptor.qualified_name()
    } else {
        format!(
            "{}_{}_{}",
            descriptor.qualified_name(),
            aggregation.as_str(),
            period.as_str()
        )
    }
}

/// Wrap an arbitrary metric identifier in the query function matching an
/// aggregation kind. Quantiles are computed over the per-instance rate.
pub fn aggregation_expr(aggregation: AggregationKind, metric: &str) -> String {
    match aggregation {
        AggregationKind::Avg => format!("avg({metric})"),
        AggregationKind::Sum => format!("sum({metric})"),
        AggregationKind::Rate => format!("rate({metric}[{RATE_WINDOW}])"),
        AggregationKind::P75 => quantile_expr(0.75, metric),
        AggregationKind::P95 => quantile_expr(0.95, metric),
        AggregationKind::P99 => quantile_expr(0.99, metric),
        AggregationKind::P999 => quantile_expr(0.999, metric),
    }
}

fn quantile_expr(quantile: f64, metric: &str) -> String {
    format!("quantile({quantile}, sum(rate({metric}[{RATE_WINDOW}])) by (instance))")
}

/// Every aggregation expression for a descriptor, in display order.
pub fn query_map(descriptor: &MetricDescriptor) -> Vec<(AggregationKind, String)> {
    AggregationKind::ALL
        .iter()
        .map(|&agg| (agg, aggregation_expr(agg, &descriptor.qualified_name())))
        .collect()
}

fn label_selector(labels: &[(&str, String)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = labels
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\""))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// The range-query expression for a service metric.
///
/// The cluster label scopes every query when a cluster id is set. The
/// space label is always present for bucketed service metrics: an empty
/// value matches series without the label, which is exactly the
/// space-less variant. Two special forms:
///  - sum over a bucketed metric uses `sum_over_time` so that restarting
///    instances don't produce sawtooth charts;
///  - process CPU seconds are charted as a rate percentage.
pub fn range_query_expr(
    descriptor: &MetricDescriptor,
    aggregation: AggregationKind,
    period: QueryPeriod,
    cluster_id: Option<&str>,
    space: Option<&str>,
    step: u64,
) -> String {
    let metric = compose_query(descriptor, aggregation, period);

    if metric.contains("cpu_seconds_total") {
        let mut labels = Vec::new();
        if let Some(cluster) = cluster_id {
            labels.push((CLUSTER_LABEL, cluster.to_string()));
        }
        return format!(
            "avg by (instance) (rate({}{}[{}])) * 100",
            metric,
            label_selector(&labels),
            CPU_RATE_WINDOW
        );
    }

    let mut labels = Vec::new();
    if let Some(cluster) = cluster_id {
        labels.push((CLUSTER_LABEL, cluster.to_string()));
    }
    if !descriptor.is_raw {
        labels.push(("space", space.unwrap_or("").to_string()));
    }
    let selector = format!("{}{}", metric, label_selector(&labels));

    if !descriptor.is_raw && aggregation == AggregationKind::Sum {
        format!("sum_over_time({selector}[{step}s])")
    } else {
        selector
    }
}

/// The status query for a component: the scrape-side `<prefix>_count`
/// series, 1 when an instance answered its last scrape.
pub fn status_query(kind: ServiceKind, cluster_id: Option<&str>) -> String {
    let metric = format!("nebula_{}_count", kind.name_infix());
    match cluster_id {
        Some(cluster) => format!("{}{}", metric, label_selector(&[(CLUSTER_LABEL, cluster.to_string())])),
        None => metric,
    }
}

/// Which space variant a metric-name listing asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceFilter {
    /// No space label in the selector (legacy releases, non-graphd).
    Ignore,
    /// Only the space-less variants.
    Empty,
    /// Only the space-scoped variants.
    NonEmpty,
}

/// The `match[]` selector listing a component's exported names, excluding
/// alerting series and the `_count` status series.
pub fn listing_selector(kind: ServiceKind, space: SpaceFilter, cluster_id: Option<&str>) -> String {
    let mut parts = vec![format!("componentType=\"{}\"", kind.component_type())];
    match space {
        SpaceFilter::Ignore => {}
        SpaceFilter::Empty => parts.push("space=\"\"".to_string()),
        SpaceFilter::NonEmpty => parts.push("space!=\"\"".to_string()),
    }
    parts.push("__name__!~\"ALERTS.*\"".to_string());
    parts.push("__name__!~\".*count\"".to_string());
    if let Some(cluster) = cluster_id {
        parts.push(format!("{CLUSTER_LABEL}=\"{cluster}\""));
    }
    format!("{{{}}}", parts.join(","))
}

/// Selector matching everything in one cluster, for label discovery.
pub fn cluster_selector(cluster_id: &str) -> String {
    format!("{{{CLUSTER_LABEL}=\"{cluster_id}\"}}")
}

/// Selector for disk-device discovery via the node exporter.
pub fn disk_device_selector(cluster_id: Option<&str>) -> String {
    let mut parts = vec!["__name__=\"node_disk_read_bytes_total\"".to_string()];
    if let Some(cluster) = cluster_id {
        parts.push(format!("{CLUSTER_LABEL}=\"{cluster}\""));
    }
    format!("{{{}}}", parts.join(","))
}
