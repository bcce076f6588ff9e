//! The narrow contract to the metrics backend.
//!
//! The core only needs two operations: execute a range query and list
//! names/label values. Everything else about the backend, including its
//! transport, stays behind [`MetricsBackend`].

pub mod prometheus;

use crate::datamodel::Matrix;
use async_trait::async_trait;
use thiserror::Error;

pub use prometheus::PrometheusBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend transport error: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend reported non-success: {0}")]
    NonSuccess(String),
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

/// Parameters of one range query, timestamps in unix seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub query: String,
    pub start: i64,
    pub end: i64,
    pub step: u64,
}

#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Evaluate a query expression over a time range.
    async fn range_query(&self, query: &RangeQuery) -> Result<Matrix, BackendError>;

    /// List the exported metric names matching a series selector.
    async fn metric_names(&self, selector: &str) -> Result<Vec<String>, BackendError>;

    /// List the values of one label, optionally restricted by a selector
    /// and a time window.
    async fn label_values(
        &self,
        label: &str,
        selector: Option<&str>,
        window: Option<(i64, i64)>,
    ) -> Result<Vec<String>, BackendError>;

    /// Cheap connectivity probe for readiness checks.
    async fn health_check(&self) -> Result<(), BackendError>;
}
