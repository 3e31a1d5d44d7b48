//! Process health state
//!
//! Two independent flags plus the process start instant. Any order of
//! admin calls is legal and the most recent write wins.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Time the process needs before the startup probe passes.
pub const DEFAULT_STARTUP_THRESHOLD: Duration = Duration::from_secs(5);

/// Health and readiness flags shared by every request handler.
#[derive(Debug)]
pub struct ServiceHealthState {
    started_at: Instant,
    startup_threshold: Duration,
    healthy: AtomicBool,
    ready: AtomicBool,
}

impl Default for ServiceHealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceHealthState {
    /// Healthy and ready, started now
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_STARTUP_THRESHOLD)
    }

    pub fn with_threshold(startup_threshold: Duration) -> Self {
        Self::started_at(Instant::now(), startup_threshold)
    }

    /// State whose clock began at `started_at`
    pub fn started_at(started_at: Instant, startup_threshold: Duration) -> Self {
        Self {
            started_at,
            startup_threshold,
            healthy: AtomicBool::new(true),
            ready: AtomicBool::new(true),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Make the liveness probe fail
    pub fn fail(&self) {
        self.healthy.store(false, Ordering::SeqCst);
    }

    /// Make the readiness probe fail
    pub fn unready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Restore both probes
    pub fn recover(&self) {
        self.healthy.store(true, Ordering::SeqCst);
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the startup probe passes at `now`.
    ///
    /// Elapsed time equal to the threshold counts as started.
    pub fn startup_complete_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.startup_threshold
    }

    pub fn startup_complete(&self) -> bool {
        self.startup_complete_at(Instant::now())
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            healthy: self.is_healthy(),
            ready: self.is_ready(),
            started: self.startup_complete(),
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

/// Point-in-time view of [`ServiceHealthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub ready: bool,
    pub started: bool,
    pub uptime_secs: u64,
}
