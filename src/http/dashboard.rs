//! The dashboard API consumed by the view layer.
//!
//! Thin handlers: parse the request, call the store, serialize the
//! result. All business logic lives behind [`DashboardStore`].

use super::app_error::AppError;
use super::state::HttpServerState;
use crate::chart::ChartView;
use crate::config;
use crate::datamodel::{FilterPatch, ServiceKind};
use crate::promql::machine;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_STATUS_LOOKBACK_SECONDS: i64 = 60;

fn parse_kind(kind: &str) -> Result<ServiceKind, AppError> {
    ServiceKind::from_component_type(kind)
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("unknown component type: {kind}")))
}

#[derive(Debug, Deserialize)]
pub struct MetricsListQuery {
    /// Product version of the cluster, used to pick the listing scheme.
    pub version: Option<String>,
}

/// List the classified metric descriptors of one component.
///
/// Refreshes the descriptors from the backend's name listing on every
/// call; the listing is cheap and versions change rarely but matter.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/{kind}",
    tag = "Metrics",
    params(
        ("kind" = String, Path, description = "Component type, e.g. graphd"),
        ("version" = Option<String>, Query, description = "Cluster product version"),
    ),
    responses(
        (status = 200, description = "Classified metric descriptors"),
        (status = 400, description = "Unknown component type"),
    )
)]
pub async fn list_metrics(
    State(state): State<HttpServerState>,
    Path(kind): Path<String>,
    Query(query): Query<MetricsListQuery>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let version = query.version.unwrap_or_default();
    let descriptors = state.store.refresh_descriptors(kind, &version).await;
    Ok(Json(json!(descriptors)))
}

/// The fixed machine-metric catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/machine/metrics",
    tag = "Metrics",
    responses((status = 200, description = "Machine metric catalogue"))
)]
pub async fn list_machine_metrics() -> Json<Value> {
    Json(json!(machine::MACHINE_METRICS))
}

#[utoipa::path(
    get,
    path = "/api/v1/filters",
    tag = "Filters",
    responses((status = 200, description = "Current filter state"))
)]
pub async fn get_filters(State(state): State<HttpServerState>) -> Json<Value> {
    Json(json!(state.store.filter()))
}

/// Apply a partial filter update. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/v1/filters",
    tag = "Filters",
    responses((status = 200, description = "Updated filter state"))
)]
pub async fn update_filters(
    State(state): State<HttpServerState>,
    Json(patch): Json<FilterPatch>,
) -> Json<Value> {
    Json(json!(state.store.update_filter(&patch)))
}

/// Point the refresh loop at a series.
#[utoipa::path(
    put,
    path = "/api/v1/target",
    tag = "Series",
    responses((status = 200, description = "Watched series set"))
)]
pub async fn set_target(
    State(state): State<HttpServerState>,
    Json(target): Json<crate::datamodel::SeriesTarget>,
) -> Json<Value> {
    state.store.set_target(Some(target));
    Json(json!(state.store.target()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/target",
    tag = "Series",
    responses((status = 200, description = "Watched series cleared"))
)]
pub async fn clear_target(State(state): State<HttpServerState>) -> Json<Value> {
    state.store.set_target(None);
    Json(json!(null))
}

/// Fetch the watched series now and return the derived chart view.
#[utoipa::path(
    post,
    path = "/api/v1/series/fetch",
    tag = "Series",
    responses(
        (status = 200, description = "Derived chart view"),
        (status = 400, description = "No series target set"),
    )
)]
pub async fn fetch_series(
    State(state): State<HttpServerState>,
) -> Result<Json<ChartView>, AppError> {
    match state.store.fetch_target().await {
        Some(view) => Ok(Json(view)),
        None => Err(AppError::bad_request(anyhow::anyhow!("no series target set"))),
    }
}

/// The last fetched chart view, whether from polling or a manual fetch.
#[utoipa::path(
    get,
    path = "/api/v1/series",
    tag = "Series",
    responses((status = 200, description = "Last derived chart view"))
)]
pub async fn last_series(State(state): State<HttpServerState>) -> Json<ChartView> {
    Json(
        state
            .store
            .last_view()
            .await
            .unwrap_or_else(|| ChartView::empty(None)),
    )
}

/// Online/offline instance counts for every core component at once,
/// keyed by component type. Backs the overview status cards.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Status",
    responses((status = 200, description = "Status summary per core component"))
)]
pub async fn cluster_status(State(state): State<HttpServerState>) -> Json<Value> {
    let lookback = config::get()
        .map(|c| c.status_lookback_seconds)
        .unwrap_or(DEFAULT_STATUS_LOOKBACK_SECONDS);
    let mut summaries = serde_json::Map::new();
    for kind in ServiceKind::CORE {
        let summary = state.store.fetch_status(kind, lookback).await;
        summaries.insert(kind.to_string(), json!(summary));
    }
    Json(Value::Object(summaries))
}

/// Online/offline instance counts for one component.
#[utoipa::path(
    get,
    path = "/api/v1/status/{kind}",
    tag = "Status",
    params(("kind" = String, Path, description = "Component type, e.g. graphd")),
    responses(
        (status = 200, description = "Status summary"),
        (status = 400, description = "Unknown component type"),
    )
)]
pub async fn service_status(
    State(state): State<HttpServerState>,
    Path(kind): Path<String>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let lookback = config::get()
        .map(|c| c.status_lookback_seconds)
        .unwrap_or(DEFAULT_STATUS_LOOKBACK_SECONDS);
    let summary = state.store.fetch_status(kind, lookback).await;
    Ok(Json(json!(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/spaces",
    tag = "Discovery",
    responses((status = 200, description = "Graph spaces with data in the current window"))
)]
pub async fn list_spaces(State(state): State<HttpServerState>) -> Json<Value> {
    Json(json!(state.store.refresh_spaces().await))
}

#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Discovery",
    responses((status = 200, description = "Disk devices reported by the node exporter"))
)]
pub async fn list_devices(State(state): State<HttpServerState>) -> Json<Value> {
    Json(json!(state.store.refresh_devices().await))
}

#[utoipa::path(
    get,
    path = "/api/v1/instances",
    tag = "Discovery",
    responses((status = 200, description = "Instances seen in fetched series"))
)]
pub async fn list_instances(State(state): State<HttpServerState>) -> Json<Value> {
    Json(json!(state.store.instances().await))
}
