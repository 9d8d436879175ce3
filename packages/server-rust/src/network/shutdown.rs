//! Gateway lifecycle and the in-flight drain.
//!
//! Probes read the lifecycle state lock-free from an `ArcSwap`. Every admin
//! request holds an [`InFlightGuard`]; when the last guard of a draining
//! gateway drops, the drain waiter is woken directly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;
use tracing::info;

/// Where the gateway is in its life: `Starting -> Ready -> Draining -> Stopped`.
///
/// Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthState {
    Starting,
    Ready,
    /// Shutdown requested; in-flight requests finish, new ones are refused.
    Draining,
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    /// Whether new admin requests are let through.
    #[must_use]
    pub fn accepts_requests(self) -> bool {
        self < Self::Draining
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct InFlight {
    count: AtomicU64,
    idle: Notify,
}

/// Lifecycle state plus the count of admin requests still running.
#[derive(Debug)]
pub struct ShutdownController {
    state: ArcSwap<HealthState>,
    in_flight: Arc<InFlight>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(HealthState::Starting),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.state.load()
    }

    /// `Starting -> Ready`. Returns `false` when the gateway is already past
    /// starting, so a draining gateway is never revived.
    pub fn mark_ready(&self) -> bool {
        self.advance(HealthState::Starting, HealthState::Ready)
    }

    /// Stops admitting admin requests. Returns `true` only for the call that
    /// actually started the drain.
    pub fn begin_drain(&self) -> bool {
        let previous = self.state.rcu(|current| {
            if current.accepts_requests() {
                Arc::new(HealthState::Draining)
            } else {
                Arc::clone(current)
            }
        });
        let started = previous.accepts_requests();
        if started {
            info!(in_flight = self.in_flight_count(), "gateway draining");
        }
        started
    }

    /// Final state once listeners and the messaging provider are closed.
    pub fn mark_stopped(&self) {
        self.state.store(Arc::new(HealthState::Stopped));
    }

    /// Counts one admin request until the guard drops, including on unwind.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Waits until no admin request is in flight, for at most `timeout`.
    /// Returns whether the drain completed.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                // Registered before the check so a guard dropping in between
                // still wakes us.
                let idle = self.in_flight.idle.notified();
                if self.in_flight_count() == 0 {
                    return;
                }
                idle.await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }

    fn advance(&self, from: HealthState, to: HealthState) -> bool {
        let previous = self.state.rcu(|current| {
            if **current == from {
                Arc::new(to)
            } else {
                Arc::clone(current)
            }
        });
        *previous == from
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the lifetime of one admin request.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}
