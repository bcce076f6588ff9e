pub mod aggregation;
pub mod descriptor;
pub mod filter;
pub mod series;
pub mod service_kind;
pub mod value_type;

pub use aggregation::AggregationKind;
pub use descriptor::MetricDescriptor;
pub use filter::{
    FilterPatch, MetricsFilter, QueryPeriod, RefreshFrequency, SeriesTarget, TimeRange,
};
pub use series::{Matrix, MetricSeries, SeriesPoint, StatusSummary};
pub use service_kind::ServiceKind;
pub use value_type::ValueType;
