//! The dashboard state container and fetch orchestration.
//!
//! [`DashboardStore`] owns everything the view layer reads: classified
//! descriptors per component, the filter state, discovered instances,
//! spaces and disk devices, and the last fetched chart view. Series are
//! replaced wholesale on every refresh; there is no incremental merge.
//!
//! Backend failures never propagate past this layer: a failed listing or
//! range query degrades to an empty result with a warning, so the view
//! shows an empty chart instead of an error page.

use crate::backend::{BackendError, MetricsBackend, RangeQuery};
use crate::chart::{self, ChartView};
use crate::classify::{self, MetricListing, version};
use crate::datamodel::{
    FilterPatch, Matrix, MetricDescriptor, MetricsFilter, SeriesTarget, ServiceKind, StatusSummary,
};
use crate::promql::{self, machine};
use crate::timeseries;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::warn;

#[derive(Default)]
struct StoreInner {
    descriptors: HashMap<ServiceKind, Vec<MetricDescriptor>>,
    instances: Vec<String>,
    spaces: Vec<String>,
    devices: Vec<String>,
    last_view: Option<ChartView>,
}

pub struct DashboardStore {
    backend: Arc<dyn MetricsBackend>,
    cluster_id: Option<String>,
    filter_tx: watch::Sender<MetricsFilter>,
    target_tx: watch::Sender<Option<SeriesTarget>>,
    inner: RwLock<StoreInner>,
}

impl DashboardStore {
    pub fn new(backend: Arc<dyn MetricsBackend>, cluster_id: Option<String>) -> Self {
        let (filter_tx, _) = watch::channel(MetricsFilter::default());
        let (target_tx, _) = watch::channel(None);
        Self {
            backend,
            cluster_id,
            filter_tx,
            target_tx,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn backend(&self) -> Arc<dyn MetricsBackend> {
        self.backend.clone()
    }

    pub fn filter(&self) -> MetricsFilter {
        self.filter_tx.borrow().clone()
    }

    /// Apply a partial filter update and notify watchers. The poller
    /// resets its timer on every change.
    pub fn update_filter(&self, patch: &FilterPatch) -> MetricsFilter {
        self.filter_tx.send_modify(|filter| patch.apply(filter));
        self.filter()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<MetricsFilter> {
        self.filter_tx.subscribe()
    }

    pub fn target(&self) -> Option<SeriesTarget> {
        self.target_tx.borrow().clone()
    }

    pub fn set_target(&self, target: Option<SeriesTarget>) {
        self.target_tx.send_replace(target);
    }

    pub fn subscribe_target(&self) -> watch::Receiver<Option<SeriesTarget>> {
        self.target_tx.subscribe()
    }

    /// Refresh the classified descriptors of one component from the
    /// backend's name listing, gated on the product version.
    pub async fn refresh_descriptors(
        &self,
        kind: ServiceKind,
        product_version: &str,
    ) -> Vec<MetricDescriptor> {
        let plan = version::listing_plan(kind, product_version, self.cluster_id.as_deref());
        let metric_list = self.names_or_empty(&plan.primary).await;
        let space_metric_list = match &plan.space_scoped {
            Some(selector) => self.names_or_empty(selector).await,
            None => Vec::new(),
        };
        let listing = MetricListing {
            metric_list,
            space_metric_list,
        };
        let descriptors = classify::classify_service_metrics(kind, &listing);

        let mut inner = self.inner.write().await;
        inner.descriptors.insert(kind, descriptors.clone());
        descriptors
    }

    pub async fn descriptors(&self, kind: ServiceKind) -> Vec<MetricDescriptor> {
        self.inner
            .read()
            .await
            .descriptors
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    async fn descriptor(&self, kind: ServiceKind, metric: &str) -> Option<MetricDescriptor> {
        self.inner
            .read()
            .await
            .descriptors
            .get(&kind)
            .and_then(|list| list.iter().find(|d| d.name == metric))
            .cloned()
    }

    /// Fetch and derive the chart for one classified service metric.
    pub async fn fetch_series(&self, kind: ServiceKind, metric: &str) -> ChartView {
        let filter = self.filter();
        let Some(descriptor) = self.descriptor(kind, metric).await else {
            warn!(kind = %kind, metric, "no descriptor for requested metric");
            return self.remember(ChartView::empty(None)).await;
        };

        let aggregation = descriptor.pick_aggregation(filter.aggregation);
        let (start, end) = timeseries::resolve_time_range(filter.time_range);
        let info = timeseries::query_range_info(start, end);
        let space = match kind {
            ServiceKind::Graphd => filter.space.as_deref(),
            _ => None,
        };
        let query = promql::range_query_expr(
            &descriptor,
            aggregation,
            filter.period,
            self.cluster_id.as_deref(),
            space,
            info.step,
        );

        let matrix = self.query_or_empty(query, info.start, info.end, info.step).await;
        self.merge_instances(&matrix).await;
        let view = chart::build_view(&matrix, &filter, descriptor.value_type);
        self.remember(view).await
    }

    /// Fetch and derive the chart for a machine metric.
    pub async fn fetch_machine_series(&self, metric: &str) -> ChartView {
        let filter = self.filter();
        let Some(machine_metric) = machine::find(metric) else {
            warn!(metric, "unknown machine metric");
            return self.remember(ChartView::empty(None)).await;
        };

        let (start, end) = timeseries::resolve_time_range(filter.time_range);
        let info = timeseries::query_range_info(start, end);
        let query = machine::scoped_query(machine_metric.query, self.cluster_id.as_deref());
        let matrix = self.query_or_empty(query, info.start, info.end, info.step).await;
        self.merge_instances(&matrix).await;
        let view = chart::build_view(&matrix, &filter, machine_metric.value_type);
        self.remember(view).await
    }

    /// Refetch whatever series the view is currently watching.
    pub async fn fetch_target(&self) -> Option<ChartView> {
        match self.target() {
            Some(SeriesTarget::Service { kind, metric }) => {
                Some(self.fetch_series(kind, &metric).await)
            }
            Some(SeriesTarget::Machine { metric }) => {
                Some(self.fetch_machine_series(&metric).await)
            }
            None => None,
        }
    }

    /// Count online/offline instances of a component from the last sample
    /// of each status series over the given lookback window.
    pub async fn fetch_status(&self, kind: ServiceKind, lookback_seconds: i64) -> StatusSummary {
        let (_, end) = timeseries::resolve_time_range(self.filter().time_range);
        let start = end - lookback_seconds.max(1);
        let info = timeseries::query_range_info(start, end);
        let query = promql::status_query(kind, self.cluster_id.as_deref());
        let matrix = self.query_or_empty(query, info.start, info.end, info.step).await;

        let mut summary = StatusSummary::default();
        for series in matrix.series() {
            match series.last_value() {
                Some(value) if value == 1.0 => summary.normal += 1,
                _ => summary.abnormal += 1,
            }
        }
        summary
    }

    /// Discover the graph spaces with data in the current time window.
    pub async fn refresh_spaces(&self) -> Vec<String> {
        let window = timeseries::resolve_time_range(self.filter().time_range);
        let selector = self.cluster_id.as_deref().map(promql::cluster_selector);
        let spaces = self
            .label_values_or_empty("space", selector.as_deref(), Some(window))
            .await;
        self.inner.write().await.spaces = spaces.clone();
        spaces
    }

    /// Discover the disk devices the node exporter reports.
    pub async fn refresh_devices(&self) -> Vec<String> {
        let selector = promql::disk_device_selector(self.cluster_id.as_deref());
        let devices = self
            .label_values_or_empty("device", Some(&selector), None)
            .await;
        self.inner.write().await.devices = devices.clone();
        devices
    }

    pub async fn instances(&self) -> Vec<String> {
        self.inner.read().await.instances.clone()
    }

    pub async fn spaces(&self) -> Vec<String> {
        self.inner.read().await.spaces.clone()
    }

    pub async fn devices(&self) -> Vec<String> {
        self.inner.read().await.devices.clone()
    }

    pub async fn last_view(&self) -> Option<ChartView> {
        self.inner.read().await.last_view.clone()
    }

    async fn remember(&self, view: ChartView) -> ChartView {
        self.inner.write().await.last_view = Some(view.clone());
        view
    }

    async fn merge_instances(&self, matrix: &Matrix) {
        let fresh = matrix.instances();
        if fresh.is_empty() {
            return;
        }
        let mut inner = self.inner.write().await;
        for instance in fresh {
            if !inner.instances.contains(&instance) {
                inner.instances.push(instance);
            }
        }
    }

    async fn query_or_empty(&self, query: String, start: i64, end: i64, step: u64) -> Matrix {
        let range_query = RangeQuery {
            query,
            start,
            end,
            step,
        };
        match self.backend.range_query(&range_query).await {
            Ok(matrix) => matrix,
            Err(error) => {
                warn_degraded("range query", &range_query.query, &error);
                Matrix::default()
            }
        }
    }

    async fn names_or_empty(&self, selector: &str) -> Vec<String> {
        match self.backend.metric_names(selector).await {
            Ok(names) => names,
            Err(error) => {
                warn_degraded("name listing", selector, &error);
                Vec::new()
            }
        }
    }

    async fn label_values_or_empty(
        &self,
        label: &str,
        selector: Option<&str>,
        window: Option<(i64, i64)>,
    ) -> Vec<String> {
        match self.backend.label_values(label, selector, window).await {
            Ok(values) => values,
            Err(error) => {
                warn_degraded("label values", label, &error);
                Vec::new()
            }
        }
    }
}

fn warn_degraded(operation: &str, subject: &str, error: &BackendError) {
    warn!(operation, subject, error = %error, "backend call failed, degrading to empty result");
}
