//! Prometheus-compatible HTTP API client.
//!
//! Talks to `/api/v1/query_range` and `/api/v1/label/<name>/values`.
//! Timestamps on the wire are unix seconds; sample values arrive as
//! strings and unparsable ones are dropped rather than surfaced.

use super::{BackendError, MetricsBackend, RangeQuery};
use crate::datamodel::{Matrix, MetricSeries, SeriesPoint};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct PrometheusBackend {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(rename = "resultType")]
    #[allow(dead_code)]
    result_type: String,
    #[serde(default)]
    result: Vec<RangeSeries>,
}

#[derive(Debug, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<Sample>,
}

/// One wire sample: `[unix_seconds, "value"]`.
#[derive(Debug, Deserialize)]
struct Sample(f64, String);

impl RangeSeries {
    fn into_series(self) -> MetricSeries {
        let points = self
            .values
            .into_iter()
            .filter_map(|Sample(timestamp, value)| {
                value.parse::<f64>().ok().map(|value| SeriesPoint {
                    timestamp: timestamp as i64,
                    value,
                })
            })
            .collect();
        MetricSeries {
            labels: self.metric,
            points,
        }
    }
}

impl PrometheusBackend {
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        // Url::join drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if envelope.status != "success" {
            return Err(BackendError::NonSuccess(
                envelope.error.unwrap_or_else(|| envelope.status.clone()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| BackendError::Decode("success response without data".to_string()))
    }
}

#[async_trait]
impl MetricsBackend for PrometheusBackend {
    async fn range_query(&self, query: &RangeQuery) -> Result<Matrix, BackendError> {
        debug!(
            query = %query.query,
            start = query.start,
            end = query.end,
            step = query.step,
            "range query"
        );
        let url = self.endpoint("api/v1/query_range")?;
        let params = [
            ("query", query.query.clone()),
            ("start", query.start.to_string()),
            ("end", query.end.to_string()),
            ("step", query.step.to_string()),
        ];
        let data: RangeData = self.get_data(url, &params).await?;
        Ok(Matrix(data.result.into_iter().map(RangeSeries::into_series).collect()))
    }

    async fn metric_names(&self, selector: &str) -> Result<Vec<String>, BackendError> {
        self.label_values("__name__", Some(selector), None).await
    }

    async fn label_values(
        &self,
        label: &str,
        selector: Option<&str>,
        window: Option<(i64, i64)>,
    ) -> Result<Vec<String>, BackendError> {
        let url = self.endpoint(&format!("api/v1/label/{label}/values"))?;
        let mut params = Vec::new();
        if let Some(selector) = selector {
            params.push(("match[]", selector.to_string()));
        }
        if let Some((start, end)) = window {
            params.push(("start", start.to_string()));
            params.push(("end", end.to_string()));
        }
        self.get_data(url, &params).await
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let url = self.endpoint("-/ready")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status {
                status: response.status().as_u16(),
                message: "backend not ready".to_string(),
            })
        }
    }
}
