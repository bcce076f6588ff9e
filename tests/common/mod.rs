//! Shared test fixtures: a scriptable in-memory metrics backend.

use async_trait::async_trait;
use graphwatch::backend::{BackendError, MetricsBackend, RangeQuery};
use graphwatch::datamodel::{Matrix, MetricSeries, SeriesPoint};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MockBackend {
    /// Names returned for the primary (space-less) listing.
    pub primary_names: Vec<String>,
    /// Names returned for the space-scoped listing.
    pub space_names: Vec<String>,
    /// Matrix returned for every range query.
    pub matrix: Matrix,
    /// Values returned for label-values queries.
    pub labels: Vec<String>,
    /// Every range query issued, for assertions.
    pub queries: Mutex<Vec<RangeQuery>>,
    /// Every listing selector issued, for assertions.
    pub selectors: Mutex<Vec<String>>,
    /// When set, every call fails.
    pub failing: AtomicBool,
}

impl MockBackend {
    pub fn with_listing(primary: &[&str], space: &[&str]) -> Self {
        Self {
            primary_names: primary.iter().map(|s| s.to_string()).collect(),
            space_names: space.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_matrix(matrix: Matrix) -> Self {
        Self {
            matrix,
            ..Default::default()
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn recorded_queries(&self) -> Vec<RangeQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn recorded_selectors(&self) -> Vec<String> {
        self.selectors.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BackendError::Transport("mock backend down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetricsBackend for MockBackend {
    async fn range_query(&self, query: &RangeQuery) -> Result<Matrix, BackendError> {
        self.check()?;
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.matrix.clone())
    }

    async fn metric_names(&self, selector: &str) -> Result<Vec<String>, BackendError> {
        self.check()?;
        self.selectors.lock().unwrap().push(selector.to_string());
        if selector.contains("space!=\"\"") {
            Ok(self.space_names.clone())
        } else {
            Ok(self.primary_names.clone())
        }
    }

    async fn label_values(
        &self,
        _label: &str,
        _selector: Option<&str>,
        _window: Option<(i64, i64)>,
    ) -> Result<Vec<String>, BackendError> {
        self.check()?;
        Ok(self.labels.clone())
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        self.check()
    }
}

/// A one-instance series with the given samples.
pub fn series(instance: &str, values: &[(i64, f64)]) -> MetricSeries {
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
