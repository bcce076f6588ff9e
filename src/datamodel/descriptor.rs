use crate::datamodel::{AggregationKind, ValueType};
use serde::{Deserialize, Serialize};

/// A metric exported by a cluster component, derived from the backend's
/// raw name listing. Immutable once classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// The bare metric name, e.g. "num_queries".
    pub name: String,

    /// The exported prefix, e.g. "nebula_graphd".
    pub prefix: String,

    /// Semantic classification of the values.
    pub value_type: ValueType,

    /// Whether per-space variants of this metric exist.
    pub is_space_scoped: bool,

    /// Whether the metric is pre-aggregated at the source and carries no
    /// aggregation/period suffix.
    pub is_raw: bool,

    /// Aggregation variants seen in the listing, `sum` first when present.
    pub aggregations: Vec<AggregationKind>,
}

impl MetricDescriptor {
    /// The exported identifier without aggregation/period suffix,
    /// e.g. "nebula_graphd_num_queries".
    pub fn qualified_name(&self) -> String {
        format!("{}_{}", self.prefix, self.name)
    }

    /// The aggregation to chart by default: the requested one when the
    /// listing exposes it, otherwise the first one seen, otherwise sum.
    pub fn pick_aggregation(&self, wanted: AggregationKind) -> AggregationKind {
        if self.is_raw || self.aggregations.contains(&wanted) {
            wanted
        } else {
            self.aggregations.first().copied().unwrap_or(AggregationKind::Sum)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> MetricDescriptor {
        MetricDescriptor {
            name: "num_queries".to_string(),
            prefix: "nebula_graphd".to_string(),
            value_type: ValueType::Number,
            is_space_scoped: false,
            is_raw: false,
            aggregations: vec![AggregationKind::Avg, AggregationKind::Rate],
        }
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(descriptor().qualified_name(), "nebula_graphd_num_queries");
    }

    #[test]
    fn test_pick_aggregation() {
        let d = descriptor();
        assert_eq!(d.pick_aggregation(AggregationKind::Rate), AggregationKind::Rate);
        // Falls back to the first listed variant.
        assert_eq!(d.pick_aggregation(AggregationKind::Sum), AggregationKind::Avg);

        let mut raw = descriptor();
        raw.is_raw = true;
        raw.aggregations.clear();
        assert_eq!(raw.pick_aggregation(AggregationKind::P99), AggregationKind::P99);
    }
}
