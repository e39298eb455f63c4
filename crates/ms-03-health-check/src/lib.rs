//! # Health Checker
//!
//! Named probes aggregated on demand.
//!
//! Probes run synchronously on the caller's thread, one after another, with
//! no timeout. They are expected to be fast reads of component state (a
//! breaker's state, whether the pool is running); a slow probe stalls the
//! whole report.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

/// Status string for a passing probe.
pub const HEALTHY: &str = "healthy";

/// Status string for a failing probe or report.
pub const UNHEALTHY: &str = "unhealthy";

type Probe = Arc<dyn Fn() -> Result<(), String> + Send + Sync>;

/// Aggregated health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// `"healthy"` when every probe passed.
    pub status: &'static str,
    /// Per-probe result: `"healthy"` or `"unhealthy: <cause>"`.
    pub checks: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

/// Registry of health probes.
#[derive(Default)]
pub struct HealthChecker {
    checks: RwLock<BTreeMap<String, Probe>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `probe` under `name`, replacing any probe already there.
    pub fn register_check<F, E>(&self, name: impl Into<String>, probe: F)
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Display,
    {
        let name = name.into();
        let probe: Probe = Arc::new(move || probe().map_err(|e| e.to_string()));
        if self.checks.write().insert(name.clone(), probe).is_some() {
            warn!(check = %name, "Health check re-registered, replacing previous probe");
        } else {
            debug!(check = %name, "Health check registered");
        }
    }

    /// Run every probe and aggregate the results.
    pub fn check_health(&self) -> HealthReport {
        // Probes run without the registry lock so they may register checks.
        let probes: Vec<(String, Probe)> = self
            .checks
            .read()
            .iter()
            .map(|(name, probe)| (name.clone(), Arc::clone(probe)))
            .collect();

        let mut healthy = true;
        let checks = probes
            .into_iter()
            .map(|(name, probe)| {
                let status = match probe() {
                    Ok(()) => HEALTHY.to_string(),
                    Err(cause) => {
                        healthy = false;
                        warn!(check = %name, cause = %cause, "Health check failed");
                        format!("{UNHEALTHY}: {cause}")
                    }
                };
                (name, status)
            })
            .collect();

        HealthReport {
            status: if healthy { HEALTHY } else { UNHEALTHY },
            checks,
            timestamp: Utc::now(),
        }
    }

    /// Registered check names, sorted.
    pub fn check_names(&self) -> Vec<String> {
        self.checks.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.checks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.read().is_empty()
    }
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("checks", &self.check_names())
            .finish()
    }
}
