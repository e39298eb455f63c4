//! Random failure injection for simulating flaky dependencies.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Decides whether a simulated operation should fail.
///
/// The rate is stored as `f64` bits so it can be changed at runtime from any
/// thread. Values are clamped to `0.0..=1.0`.
#[derive(Debug)]
pub struct FaultInjector {
    failure_rate: AtomicU64,
}

impl FaultInjector {
    /// Create an injector failing with probability `failure_rate`.
    #[must_use]
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: AtomicU64::new(clamp_rate(failure_rate).to_bits()),
        }
    }

    /// An injector that never fails.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0.0)
    }

    /// Current failure probability.
    pub fn failure_rate(&self) -> f64 {
        f64::from_bits(self.failure_rate.load(Ordering::Relaxed))
    }

    /// Change the failure probability.
    pub fn set_failure_rate(&self, rate: f64) {
        self.failure_rate
            .store(clamp_rate(rate).to_bits(), Ordering::Relaxed);
    }

    /// Roll the dice.
    pub fn should_fail(&self) -> bool {
        let rate = self.failure_rate();
        if rate <= 0.0 {
            return false;
        }
        if rate >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_bool(rate)
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::disabled()
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}
