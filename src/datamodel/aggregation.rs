use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// The aggregation variants a component may export for a bucketed metric,
/// and the ways a chart can ask for a series to be summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Sum,
    Avg,
    Rate,
    P75,
    P95,
    P99,
    P999,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 7] = [
        AggregationKind::Sum,
        AggregationKind::Avg,
        AggregationKind::Rate,
        AggregationKind::P75,
        AggregationKind::P95,
        AggregationKind::P99,
        AggregationKind::P999,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Sum => "sum",
            AggregationKind::Avg => "avg",
            AggregationKind::Rate => "rate",
            AggregationKind::P75 => "p75",
            AggregationKind::P95 => "p95",
            AggregationKind::P99 => "p99",
            AggregationKind::P999 => "p999",
        }
    }

    /// Parse an aggregation token as it appears inside an exported metric
    /// name, e.g. the `sum` in `nebula_graphd_num_queries_sum_60`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == token)
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
