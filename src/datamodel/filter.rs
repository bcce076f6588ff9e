use crate::datamodel::{AggregationKind, ServiceKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// The time windows a chart can display, always anchored at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "1hour")]
    Hour1,
    #[serde(rename = "6hour")]
    Hour6,
    #[serde(rename = "12hour")]
    Hour12,
    #[serde(rename = "1day")]
    Day1,
    #[serde(rename = "3day")]
    Day3,
    #[serde(rename = "1week")]
    Week1,
    #[serde(rename = "2week")]
    Week2,
}

impl TimeRange {
    pub fn span_seconds(&self) -> i64 {
        match self {
            TimeRange::Hour1 => 3600,
            TimeRange::Hour6 => 6 * 3600,
            TimeRange::Hour12 => 12 * 3600,
            TimeRange::Day1 => 24 * 3600,
            TimeRange::Day3 => 3 * 24 * 3600,
            TimeRange::Week1 => 7 * 24 * 3600,
            TimeRange::Week2 => 14 * 24 * 3600,
        }
    }
}

/// How often a chart refetches its data. `Off` means manual refresh only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RefreshFrequency {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "5s")]
    Every5s,
    #[serde(rename = "10s")]
    Every10s,
    #[serde(rename = "15s")]
    Every15s,
    #[serde(rename = "30s")]
    Every30s,
    #[serde(rename = "1m")]
    Every1m,
}

impl RefreshFrequency {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            RefreshFrequency::Off => None,
            RefreshFrequency::Every5s => Some(Duration::from_secs(5)),
            RefreshFrequency::Every10s => Some(Duration::from_secs(10)),
            RefreshFrequency::Every15s => Some(Duration::from_secs(15)),
            RefreshFrequency::Every30s => Some(Duration::from_secs(30)),
            RefreshFrequency::Every1m => Some(Duration::from_secs(60)),
        }
    }
}

/// The stats flush periods components export buckets for, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum QueryPeriod {
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "60")]
    Sixty,
    #[serde(rename = "600")]
    SixHundred,
    #[serde(rename = "3600")]
    ThirtySixHundred,
}

impl QueryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryPeriod::Five => "5",
            QueryPeriod::Sixty => "60",
            QueryPeriod::SixHundred => "600",
            QueryPeriod::ThirtySixHundred => "3600",
        }
    }
}

/// The series a dashboard view is currently watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeriesTarget {
    /// A classified service metric.
    Service { kind: ServiceKind, metric: String },
    /// An entry of the machine-metric catalogue.
    Machine { metric: String },
}

/// Everything the view layer can tune about what is fetched and charted.
/// Owned by the store, mutated only through [`FilterPatch`] updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricsFilter {
    pub time_range: TimeRange,
    pub frequency: RefreshFrequency,
    /// Selected instances; the sentinel "all" selects everything.
    pub instances: Vec<String>,
    pub period: QueryPeriod,
    pub aggregation: AggregationKind,
    pub space: Option<String>,
}

impl Default for MetricsFilter {
    fn default() -> Self {
        Self {
            time_range: TimeRange::Hour1,
            frequency: RefreshFrequency::Off,
            instances: vec!["all".to_string()],
            period: QueryPeriod::Sixty,
            aggregation: AggregationKind::Sum,
            space: None,
        }
    }
}

impl MetricsFilter {
    pub fn selects_instance(&self, instance: &str) -> bool {
        self.instances.is_empty()
            || self.instances.iter().any(|i| i == "all" || i == instance)
    }
}

/// A partial filter update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<RefreshFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<QueryPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
}

impl FilterPatch {
    pub fn apply(&self, filter: &mut MetricsFilter) {
        if let Some(time_range) = self.time_range {
            filter.time_range = time_range;
        }
        if let Some(frequency) = self.frequency {
            filter.frequency = frequency;
        }
        if let Some(instances) = &self.instances {
            filter.instances = instances.clone();
        }
        if let Some(period) = self.period {
            filter.period = period;
        }
        if let Some(aggregation) = self.aggregation {
            filter.aggregation = aggregation;
        }
        if let Some(space) = &self.space {
            filter.space = if space.is_empty() { None } else { Some(space.clone()) };
        }
    }
}
