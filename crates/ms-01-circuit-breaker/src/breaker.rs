//! The circuit breaker itself.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{CircuitBreakerConfig, CircuitBreakerError, CircuitState, CircuitStats};

/// Mutable breaker state, guarded by a single mutex.
struct Circuit {
    state: CircuitState,
    /// Failures counted while closed (and by the failed trial)
    failure_count: u32,
    /// Time of the most recent failure; the open cool-down runs from here
    last_failure: Option<Instant>,
    /// Id of the half-open trial handed out and not yet finished
    trial_in_flight: Option<u64>,
    /// Source of trial ids
    next_trial: u64,
    /// Last state transition time
    last_transition: Instant,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            trial_in_flight: None,
            next_trial: 0,
            last_transition: Instant::now(),
        }
    }

    fn begin_trial(&mut self) -> u64 {
        self.next_trial += 1;
        self.trial_in_flight = Some(self.next_trial);
        self.next_trial
    }

    /// Whether `trial` is still the probe the circuit is waiting on.
    fn is_current_trial(&self, trial: u64) -> bool {
        self.state == CircuitState::HalfOpen && self.trial_in_flight == Some(trial)
    }

    fn transition(&mut self, to: CircuitState) {
        self.state = to;
        self.last_transition = Instant::now();
    }
}

/// What a caller was admitted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permit {
    /// Ordinary call while closed
    Normal,
    /// The single half-open probe
    Trial(u64),
}

/// Releases the trial permit if the trial future is dropped before it
/// reports an outcome, so the breaker cannot wedge in half-open.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    trial: Option<u64>,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if let Some(trial) = self.trial {
            self.breaker.abandon_trial(trial);
        }
    }
}

/// A named circuit breaker protecting one dependency.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
    total_requests: AtomicU64,
    total_failures: AtomicU64,
    total_rejected: AtomicU64,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    ///
    /// A `max_failures` of zero is treated as one.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            circuit: Mutex::new(Circuit::new()),
            total_requests: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
        }
    }

    /// Run `operation` through the breaker.
    ///
    /// Returns the operation's own error unchanged inside
    /// [`CircuitBreakerError::Inner`], or [`CircuitBreakerError::Open`] when
    /// the call was rejected without invoking `operation`.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.acquire() else {
            return Err(CircuitBreakerError::Open {
                name: self.name.clone(),
            });
        };

        let mut guard = TrialGuard {
            breaker: self,
            trial: match permit {
                Permit::Trial(trial) => Some(trial),
                Permit::Normal => None,
            },
        };
        let result = operation().await;
        guard.trial = None;

        match &result {
            Ok(_) => self.record_success(permit),
            Err(_) => self.record_failure(permit),
        }
        result.map_err(CircuitBreakerError::Inner)
    }

    /// Decide whether a call may proceed.
    fn acquire(&self) -> Option<Permit> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock();

        match circuit.state {
            CircuitState::Closed => Some(Permit::Normal),
            CircuitState::Open => {
                let cooled_down = circuit
                    .last_failure
                    .map_or(true, |at| at.elapsed() >= self.config.timeout);
                if cooled_down {
                    info!(breaker = %self.name, "Circuit breaker transitioning to half-open");
                    circuit.transition(CircuitState::HalfOpen);
                    Some(Permit::Trial(circuit.begin_trial()))
                } else {
                    drop(circuit);
                    self.reject();
                    None
                }
            }
            CircuitState::HalfOpen => {
                if circuit.trial_in_flight.is_some() {
                    drop(circuit);
                    self.reject();
                    None
                } else {
                    Some(Permit::Trial(circuit.begin_trial()))
                }
            }
        }
    }

    fn reject(&self) {
        self.total_rejected.fetch_add(1, Ordering::Relaxed);
        debug!(breaker = %self.name, "Circuit breaker is open, rejecting call");
    }

    fn record_success(&self, permit: Permit) {
        let mut circuit = self.circuit.lock();
        match permit {
            Permit::Trial(trial) if circuit.is_current_trial(trial) => {
                info!(breaker = %self.name, "Circuit breaker closing after successful trial");
                circuit.transition(CircuitState::Closed);
                circuit.failure_count = 0;
                circuit.last_failure = None;
                circuit.trial_in_flight = None;
            }
            Permit::Trial(trial) => {
                debug!(breaker = %self.name, trial, "Ignoring outcome of superseded trial");
            }
            Permit::Normal => {
                // A call admitted while closed only resets the count if the
                // circuit is still closed; otherwise the trial decides.
                if circuit.state == CircuitState::Closed {
                    circuit.failure_count = 0;
                }
            }
        }
    }

    fn record_failure(&self, permit: Permit) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock();
        let now = Instant::now();

        match permit {
            Permit::Trial(trial) if circuit.is_current_trial(trial) => {
                warn!(breaker = %self.name, "Circuit breaker reopening after trial failure");
                circuit.transition(CircuitState::Open);
                circuit.failure_count = circuit.failure_count.saturating_add(1);
                circuit.last_failure = Some(now);
                circuit.trial_in_flight = None;
            }
            // Reset or replaced while running: the outcome no longer applies
            Permit::Trial(trial) => {
                debug!(breaker = %self.name, trial, "Ignoring outcome of superseded trial");
            }
            Permit::Normal => match circuit.state {
                CircuitState::Closed => {
                    circuit.failure_count = circuit.failure_count.saturating_add(1);
                    circuit.last_failure = Some(now);
                    if circuit.failure_count >= self.config.max_failures.max(1) {
                        warn!(
                            breaker = %self.name,
                            failures = circuit.failure_count,
                            threshold = self.config.max_failures,
                            timeout_ms = self.config.timeout.as_millis() as u64,
                            "Circuit breaker opening due to failures"
                        );
                        circuit.transition(CircuitState::Open);
                    }
                }
                CircuitState::Open => {
                    // Late failure from a call admitted before opening.
                    circuit.last_failure = Some(now);
                }
                CircuitState::HalfOpen => {}
            },
        }
    }

    fn abandon_trial(&self, trial: u64) {
        let mut circuit = self.circuit.lock();
        if circuit.trial_in_flight == Some(trial) {
            circuit.trial_in_flight = None;
            debug!(breaker = %self.name, trial, "Half-open trial abandoned before completion");
        }
    }

    /// Breaker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Breaker configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. An open breaker whose cool-down has elapsed still
    /// reports `Open` until the next call moves it to half-open.
    pub fn state(&self) -> CircuitState {
        self.circuit.lock().state
    }

    /// Current failure count.
    pub fn failure_count(&self) -> u32 {
        self.circuit.lock().failure_count
    }

    /// Get statistics for this breaker
    pub fn stats(&self) -> CircuitStats {
        let circuit = self.circuit.lock();
        CircuitStats {
            name: self.name.clone(),
            state: circuit.state,
            failure_count: circuit.failure_count,
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            time_in_state_ms: circuit.last_transition.elapsed().as_millis() as u64,
        }
    }

    /// Reset to closed (for admin purposes).
    ///
    /// A trial still running when this is called is superseded; its outcome
    /// is ignored.
    pub fn reset(&self) {
        let mut circuit = self.circuit.lock();
        info!(breaker = %self.name, "Circuit breaker manually reset");
        circuit.transition(CircuitState::Closed);
        circuit.failure_count = 0;
        circuit.last_failure = None;
        circuit.trial_in_flight = None;
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
