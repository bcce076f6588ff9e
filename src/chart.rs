//! Derived chart data for the view layer.
//!
//! A [`ChartView`] is everything a charting component needs to draw a
//! panel: flattened points with a category label per instance, the value
//! type for axis formatting, min/max of the visible window and a tick
//! interval. No further business logic happens on the other side of this
//! boundary.

use crate::datamodel::{Matrix, MetricsFilter, ValueType};
use crate::timeseries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: i64,
    pub value: f64,
    /// Legend label, usually the originating instance.
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartView {
    pub points: Vec<ChartPoint>,
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Tick interval in seconds, sized for about ten gridlines over the
    /// span the points actually cover.
    pub tick_interval: i64,
}

impl ChartView {
    pub fn empty(value_type: Option<ValueType>) -> Self {
        Self {
            value_type,
            tick_interval: 1,
            ..Default::default()
        }
    }
}

fn floor2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Flatten a range-query matrix into chart points, keeping only the
/// instances the filter selects. An empty matrix yields an empty view
/// with undefined min/max.
pub fn build_view(matrix: &Matrix, filter: &MetricsFilter, value_type: ValueType) -> ChartView {
    let mut points = Vec::new();
    for series in matrix.series() {
        let instance = series.instance();
        if !filter.selects_instance(instance) {
            continue;
        }
        for point in &series.points {
            points.push(ChartPoint {
                time: point.timestamp,
                value: point.value,
                category: instance.to_string(),
            });
        }
    }

    let max = points.iter().map(|p| p.value).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |m| m.max(v)))
    });
    let min = points.iter().map(|p| p.value).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |m| m.min(v)))
    });

    let span = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (last.time - first.time).max(0),
        _ => 0,
    };

    ChartView {
        points,
        value_type: Some(value_type),
        max: max.map(floor2),
        min: min.map(floor2),
        tick_interval: timeseries::proper_tick_interval(span),
    }
}
