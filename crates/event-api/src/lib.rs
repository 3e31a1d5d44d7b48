//! Event API
//!
//! Small HTTP service exposing liveness, readiness and startup probe
//! endpoints for an external orchestrator, plus admin endpoints that flip
//! the probe results for testing restart and routing behaviour.
//!
//! # Endpoints
//! - `GET /` - service banner with uptime
//! - `GET /health`, `GET /ready`, `GET /startup` - probes
//! - `/fail`, `/unready`, `/recover` - admin toggles (GET or POST)
//! - `GET /metrics` - Prometheus exposition

pub mod client;
pub mod config;
pub mod handler;
pub mod metrics;
pub mod state;

pub use client::{ClientError, ProbeClient, ProbeKind, ProbeOutcome};
pub use config::ApiConfig;
pub use handler::{create_router, AppState};
pub use metrics::{MetricsError, ProbeMetrics};
pub use state::{HealthSnapshot, ServiceHealthState, DEFAULT_STARTUP_THRESHOLD};
