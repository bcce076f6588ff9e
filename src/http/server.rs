use super::app_error::AppError;
use super::dashboard;
use super::health;
use super::state::HttpServerState;
use crate::config;
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::routing::{get, post, put};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace;
use tower_http::{ServiceBuilderExt, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Level;

pub fn build_router(state: HttpServerState, max_body_limit: usize) -> Router {
    let max_body_layer = DefaultBodyLimit::max(max_body_limit);

    Router::new()
        .route("/", get(handler))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/api/v1/metrics/{kind}", get(dashboard::list_metrics))
        .route("/api/v1/machine/metrics", get(dashboard::list_machine_metrics))
        .route(
            "/api/v1/filters",
            get(dashboard::get_filters)
                .put(dashboard::update_filters)
                .layer(max_body_layer.clone()),
        )
        .route(
            "/api/v1/target",
            put(dashboard::set_target)
                .delete(dashboard::clear_target)
                .layer(max_body_layer.clone()),
        )
        .route("/api/v1/series/fetch", post(dashboard::fetch_series))
        .route("/api/v1/series", get(dashboard::last_series))
        .route("/api/v1/status", get(dashboard::cluster_status))
        .route("/api/v1/status/{kind}", get(dashboard::service_status))
        .route("/api/v1/spaces", get(dashboard::list_spaces))
        .route("/api/v1/devices", get(dashboard::list_devices))
        .route("/api/v1/instances", get(dashboard::list_instances))
        .with_state(state)
}

pub async fn run_http_server(state: HttpServerState, address: SocketAddr) -> Result<()> {
    let config = config::get()?;
    let max_body_limit = config.parse_http_body_limit()?;
    let timeout_seconds = config.http_server_timeout_seconds;

    // List of headers that shouldn't be logged
    let sensitive_headers: Arc<[_]> = vec![header::AUTHORIZATION, header::COOKIE].into();

    // Middleware creation
    let middleware = ServiceBuilder::new()
        .sensitive_request_headers(sensitive_headers.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .sensitive_response_headers(sensitive_headers)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(timeout_seconds),
        ))
        .compression()
        .into_inner();

    let app = build_router(state, max_body_limit).layer(middleware);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for the CTRL+C signal
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install shutdown CTRL+C signal handler");
}

async fn handler(State(state): State<HttpServerState>) -> Result<Json<String>, AppError> {
    let name: String = (*state.name).clone();
    Ok(Json(name))
}
