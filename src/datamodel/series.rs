use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sample of one series: unix seconds and a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: i64,
    pub value: f64,
}

/// One time series of a range-query response, with its label set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    pub labels: BTreeMap<String, String>,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// The originating instance of the series. Exporters disagree on the
    /// label name, so `instanceName` wins over `instance`.
    pub fn instance(&self) -> &str {
        self.labels
            .get("instanceName")
            .or_else(|| self.labels.get("instance"))
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// A full range-query response. Replaced wholesale on each refresh.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matrix(pub Vec<MetricSeries>);

impl Matrix {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn series(&self) -> &[MetricSeries] {
        &self.0
    }

    /// Unique instance names across all series, in first-seen order.
    pub fn instances(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for series in &self.0 {
            let instance = series.instance();
            if !seen.iter().any(|s| s == instance) {
                seen.push(instance.to_string());
            }
        }
        seen
    }
}

/// Online/offline counts for a component kind, derived from the last
/// sample of each status series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSummary {
    pub normal: u32,
    pub abnormal: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(instance: &str, values: &[(i64, f64)]) -> MetricSeries {
        let mut labels = BTreeMap::new();
        labels.insert("instance".to_string(), instance.to_string());
        MetricSeries {
            labels,
            points: values
                .iter()
                .map(|&(timestamp, value)| SeriesPoint { timestamp, value })
                .collect(),
        }
    }

    #[test]
    fn test_instance_label_priority() {
        let mut s = series("192.168.8.1:9100", &[]);
        assert_eq!(s.instance(), "192.168.8.1:9100");
        s.labels
            .insert("instanceName".to_string(), "graphd-0".to_string());
        assert_eq!(s.instance(), "graphd-0");

        let bare = MetricSeries::default();
        assert_eq!(bare.instance(), "unknown");
    }

    #[test]
    fn test_matrix_instances_deduped() {
        let matrix = Matrix(vec![
            series("a", &[(1, 1.0)]),
            series("b", &[(1, 2.0)]),
            series("a", &[(1, 3.0)]),
        ]);
        assert_eq!(matrix.instances(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_last_value() {
        let s = series("a", &[(1, 1.0), (2, 7.5)]);
        assert_eq!(s.last_value(), Some(7.5));
        assert_eq!(series("a", &[]).last_value(), None);
    }
}
