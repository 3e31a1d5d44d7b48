//! HTTP handler for the Event API
//!
//! Probe endpoints report the shared [`ServiceHealthState`] through status
//! codes only; they never fail as requests.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::metrics::{MetricsError, ProbeMetrics};
use crate::state::ServiceHealthState;

/// Version string reported by `GET /`
pub const API_VERSION: &str = "v1";

/// Application state
pub struct AppState {
    pub service: String,
    pub message: String,
    pub health: ServiceHealthState,
    pub metrics: ProbeMetrics,
}

impl AppState {
    pub fn new(
        service: impl Into<String>,
        message: impl Into<String>,
        health: ServiceHealthState,
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            service: service.into(),
            message: message.into(),
            health,
            metrics: ProbeMetrics::new()?,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, MetricsError> {
        Self::new(
            config.service_name.clone(),
            config.message.clone(),
            ServiceHealthState::with_threshold(config.startup_threshold()),
        )
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/startup", get(startup))
        .route("/fail", get(fail).post(fail))
        .route("/unready", get(unready).post(unready))
        .route("/recover", get(recover).post(recover))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    Json(HomeResponse {
        service: state.service.clone(),
        message: state.message.clone(),
        version: API_VERSION.to_string(),
        uptime: state.health.uptime().as_secs(),
    })
}

/// Liveness probe
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    let healthy = state.health.is_healthy();
    state.metrics.record_probe("health", healthy);

    if healthy {
        (StatusCode::OK, Json(StatusResponse::new("healthy")))
    } else {
        tracing::warn!("Liveness probe failing");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::new("unhealthy")),
        )
    }
}

/// Readiness probe
async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    let ready = state.health.is_ready();
    state.metrics.record_probe("ready", ready);

    if ready {
        (StatusCode::OK, Json(StatusResponse::new("ready")))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse::new("not ready")),
        )
    }
}

/// Startup probe
async fn startup(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    let started = state.health.startup_complete();
    state.metrics.record_probe("startup", started);

    if started {
        (StatusCode::OK, Json(StatusResponse::new("started")))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse::new("starting")),
        )
    }
}

async fn fail(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.health.fail();
    admin_toggled(&state, "fail", "Liveness will now fail")
}

async fn unready(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.health.unready();
    admin_toggled(&state, "unready", "Readiness will now fail")
}

async fn recover(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.health.recover();
    admin_toggled(&state, "recover", "All probes recovered")
}

fn admin_toggled(state: &AppState, action: &str, message: &str) -> Json<MessageResponse> {
    let snapshot = state.health.snapshot();
    state.metrics.record_admin(action, &snapshot);
    tracing::info!(
        action,
        healthy = snapshot.healthy,
        ready = snapshot.ready,
        started = snapshot.started,
        uptime_secs = snapshot.uptime_secs,
        "{}",
        message
    );
    Json(MessageResponse::new(message))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Service banner
#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub service: String,
    pub message: String,
    pub version: String,
    pub uptime: u64,
}

/// Probe response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Admin response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
