//! End-to-end properties of the pure derivation layer: classification,
//! query composition, step selection and unit formatting.

use graphwatch::classify::{self, MetricListing, RETIRED_METRICS};
use graphwatch::datamodel::{
    AggregationKind, MetricDescriptor, QueryPeriod, ServiceKind, TimeRange, ValueType,
};
use graphwatch::promql;
use graphwatch::timeseries;
use graphwatch::units;

fn graphd_listing() -> MetricListing {
    MetricListing {
        metric_list: vec![
            "nebula_graphd_num_queries_sum_60".to_string(),
            "nebula_graphd_num_queries_avg_60".to_string(),
            "nebula_graphd_num_queries_rate_60".to_string(),
            "nebula_graphd_query_latency_us_avg_60".to_string(),
            "nebula_graphd_query_latency_us_p99_60".to_string(),
            "nebula_graphd_query_latency_us_sum_60".to_string(),
            "nebula_graphd_cpu_seconds_total".to_string(),
            "nebula_graphd_memory_bytes_gauge".to_string(),
            // Retired in 2.5.1, must never classify.
            "nebula_graphd_num_lookup_sum_60".to_string(),
            "nebula_graphd_lookup_latency_us_avg_60".to_string(),
            // Different component, must be skipped for graphd.
            "nebula_storaged_num_edges_sum_60".to_string(),
            // Not following the naming scheme at all.
            "go_goroutines".to_string(),
        ],
        space_metric_list: vec!["nebula_graphd_num_queries_sum_60".to_string()],
    }
}

#[test]
fn classification_is_idempotent() {
    let listing = graphd_listing();
    let first = classify::classify_service_metrics(ServiceKind::Graphd, &listing);
    let second = classify::classify_service_metrics(ServiceKind::Graphd, &listing);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn retired_metrics_never_classify() {
    let descriptors = classify::classify_service_metrics(ServiceKind::Graphd, &graphd_listing());
    for descriptor in &descriptors {
        assert!(
            !RETIRED_METRICS.contains(&descriptor.name.as_str()),
            "retired metric {} classified",
            descriptor.name
        );
    }
    assert!(!descriptors.iter().any(|d| d.name == "num_lookup"));
    assert!(!descriptors.iter().any(|d| d.name == "lookup_latency_us"));
}

#[test]
fn sum_is_always_first_when_present() {
    let descriptors = classify::classify_service_metrics(ServiceKind::Graphd, &graphd_listing());
    for descriptor in &descriptors {
        if descriptor.aggregations.contains(&AggregationKind::Sum) {
            assert_eq!(
                descriptor.aggregations[0],
                AggregationKind::Sum,
                "sum not first for {}",
                descriptor.name
            );
        }
    }
    // query_latency_us listed avg before sum, yet sum must end up first.
    let latency = descriptors
        .iter()
        .find(|d| d.name == "query_latency_us")
        .unwrap();
    assert_eq!(latency.aggregations[0], AggregationKind::Sum);
}

#[test]
fn space_scope_and_value_types() {
    let descriptors = classify::classify_service_metrics(ServiceKind::Graphd, &graphd_listing());

    let queries = descriptors.iter().find(|d| d.name == "num_queries").unwrap();
    assert!(queries.is_space_scoped);
    assert_eq!(queries.value_type, ValueType::Number);

    let latency = descriptors
        .iter()
        .find(|d| d.name == "query_latency_us")
        .unwrap();
    assert!(!latency.is_space_scoped);
    assert_eq!(latency.value_type, ValueType::Latency);

    let cpu = descriptors
        .iter()
        .find(|d| d.name == "cpu_seconds_total")
        .unwrap();
    assert!(cpu.is_raw);
    assert_eq!(cpu.value_type, ValueType::Percentage);

    let memory = descriptors
        .iter()
        .find(|d| d.name == "memory_bytes_gauge")
        .unwrap();
    assert_eq!(memory.value_type, ValueType::Byte);
}

#[test]
fn raw_descriptor_composes_to_bare_name() {
    let descriptors = classify::classify_service_metrics(ServiceKind::Graphd, &graphd_listing());
    let cpu = descriptors
        .iter()
        .find(|d| d.name == "cpu_seconds_total")
        .unwrap();
    for aggregation in AggregationKind::ALL {
        for period in [QueryPeriod::Five, QueryPeriod::Sixty, QueryPeriod::ThirtySixHundred] {
            assert_eq!(
                promql::compose_query(cpu, aggregation, period),
                "nebula_graphd_cpu_seconds_total"
            );
        }
    }
}

#[test]
fn bucketed_descriptor_composes_with_suffix() {
    let descriptor = MetricDescriptor {
        name: "num_queries".to_string(),
        prefix: "nebula_graphd".to_string(),
        value_type: ValueType::Number,
        is_space_scoped: false,
        is_raw: false,
        aggregations: vec![AggregationKind::Sum],
    };
    assert_eq!(
        promql::compose_query(&descriptor, AggregationKind::Sum, QueryPeriod::Sixty),
        "nebula_graphd_num_queries_sum_60"
    );
}

#[test]
fn one_hour_step_respects_point_budget() {
    let span = TimeRange::Hour1.span_seconds();
    let step = timeseries::proper_step(0, span) as i64;
    assert!(span / step <= 300);
}

#[test]
fn megabyte_formats_as_one_mb() {
    let desc = units::proper_byte_desc(1048576.0);
    assert_eq!(desc.value, 1.0);
    assert_eq!(desc.unit, "MB");
}
