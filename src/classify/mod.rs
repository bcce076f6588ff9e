//! Turns the raw metric names a component exports into deduplicated
//! [`MetricDescriptor`]s.
//!
//! Exported names look like `nebula_graphd_num_queries_sum_60`: a vendor
//! prefix, the component name, the bare metric, an aggregation token and a
//! stats period. Entries that don't follow the scheme, and metrics retired
//! in old product releases, are skipped silently. A monitoring dashboard
//! prefers a shorter listing over a hard error.

pub mod version;

use crate::datamodel::{AggregationKind, MetricDescriptor, ServiceKind, ValueType};

/// Metrics removed from the product over several releases. Backends that
/// still hold scrapes from mixed-version clusters list them, so the
/// classifier drops them by bare name.
pub const RETIRED_METRICS: &[&str] = &[
    // <= v2.5.1
    "get_prop_latency_us",
    "get_value_latency_us",
    "lookup_latency_us",
    "num_add_edges_atomic_errors",
    "num_add_edges_atomic",
    "num_add_edges_errors",
    "num_add_edges",
    "num_add_vertices_errors",
    "num_add_vertices",
    "num_delete_edges_errors",
    "num_delete_edges",
    "num_delete_vertices_errors",
    "num_delete_vertices",
    "num_forward_tranx_errors",
    "num_forward_tranx",
    "num_get_neighbors_errors",
    "num_get_neighbors",
    "num_get_prop_errors",
    "num_get_prop",
    "num_get_value_errors",
    "num_get_value",
    "num_lookup_errors",
    "num_lookup",
    "num_scan_edge_errors",
    "num_scan_edge",
    "num_scan_vertex_errors",
    "num_scan_vertex",
    "num_update_edge_errors",
    "num_update_edge",
    "num_update_vertex_errors",
    "num_update_vertex",
    "scan_edge_latency_us",
    "scan_vertex_latency_us",
    "update_edge_latency_us",
    "update_vertex_latency_us",
    // <= v2.6.1
    "num_delete_tags_errors",
    "num_delete_tags",
    "delete_tags_latency_us",
    // = 3.0.0
    "num_kv_get_errors",
    "num_kv_get",
    "num_kv_put_errors",
    "num_kv_put",
    "num_kv_remove_errors",
    "num_kv_remove",
    "kv_get_latency_us",
    "kv_put_latency_us",
    "kv_remove_latency_us",
    "num_agent_heartbeats",
    "agent_heartbeat_latency_us",
    "num_auth_failed_sessions_out_of_max_allowed",
];

/// Process-level metrics that are pre-aggregated at the source and carry
/// no aggregation/period suffix.
pub const RAW_SERVICE_METRICS: &[&str] = &[
    "context_switches_total",
    "cpu_seconds_total",
    "memory_bytes_gauge",
    "open_filedesc_gauge",
    "read_bytes_total",
];

/// A raw metric listing for one component, as returned by the backend.
#[derive(Debug, Default, Clone)]
pub struct MetricListing {
    /// Names from the main listing.
    pub metric_list: Vec<String>,
    /// Names from the space-scoped listing, when the release has one.
    pub space_metric_list: Vec<String>,
}

/// The aggregation/period suffix split off a bare field name, e.g.
/// `num_queries_sum_60` -> (`num_queries`, `sum`).
fn split_aggregation(field: &str) -> (String, Option<AggregationKind>) {
    let tokens: Vec<&str> = field.split('_').collect();
    if tokens.len() >= 3 {
        if let Some(agg) = AggregationKind::from_token(tokens[tokens.len() - 2]) {
            return (tokens[..tokens.len() - 2].join("_"), Some(agg));
        }
    }
    (field.to_string(), None)
}

/// Substring heuristics over the bare name. Checked in order; the first
/// match wins, and anything unrecognized counts as a plain number.
fn value_type_for(name: &str) -> ValueType {
    if name.contains("num") {
        ValueType::Number
    } else if name.contains("latency") {
        ValueType::Latency
    } else if name.contains("bytes") {
        ValueType::Byte
    } else if name.contains("cpu_seconds") {
        ValueType::Percentage
    } else if name.contains("seconds") {
        ValueType::ByteSecond
    } else {
        ValueType::Number
    }
}

/// Classify a component's raw listing into descriptors.
///
/// Descriptors are deduplicated by bare name and accumulate every
/// aggregation variant seen, with `sum` always moved to the front.
/// Classification is pure: the same listing always yields the same
/// descriptors.
pub fn classify_service_metrics(kind: ServiceKind, listing: &MetricListing) -> Vec<MetricDescriptor> {
    let infix = format!("_{}_", kind.name_infix());
    let mut descriptors: Vec<MetricDescriptor> = Vec::new();

    for raw in &listing.metric_list {
        let Some((vendor, field)) = raw.split_once(&infix) else {
            continue;
        };
        if vendor.is_empty() || field.is_empty() {
            continue;
        }
        let prefix = format!("{}_{}", vendor, kind.name_infix());
        let (name, aggregation) = split_aggregation(field);
        if name.is_empty() || RETIRED_METRICS.contains(&name.as_str()) {
            continue;
        }

        if let Some(existing) = descriptors.iter_mut().find(|d| d.name == name) {
            if let Some(agg) = aggregation {
                if !existing.aggregations.contains(&agg) {
                    if agg == AggregationKind::Sum {
                        existing.aggregations.insert(0, agg);
                    } else {
                        existing.aggregations.push(agg);
                    }
                }
            }
            continue;
        }

        let is_space_scoped = listing
            .space_metric_list
            .iter()
            .any(|space_metric| space_metric.contains(&name));

        descriptors.push(MetricDescriptor {
            value_type: value_type_for(&name),
            is_space_scoped,
            is_raw: aggregation.is_none(),
            aggregations: aggregation.into_iter().collect(),
            name,
            prefix,
        });
    }

    descriptors
}
