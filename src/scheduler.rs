//! Dispatch scheduler
//!
//! Runs [`StationRelay::dispatch_tick`] on a fixed period in a dedicated tokio
//! task. The scheduler only moves from `Stopped` to `Running`; the task lives
//! until the process exits or its `JoinHandle` is aborted.
//!
//! Timing goes through `tokio::time`, so tests drive it with a paused clock
//! (`#[tokio::test(start_paused = true)]` + `tokio::time::advance`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{Error, Result};
use crate::relay::StationRelay;

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started yet
    Stopped,
    /// Recurring ticks are scheduled
    Running,
}

/// Result of one dispatch tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Readings popped and broadcast
    pub dispatched: usize,
    /// Readings popped with nobody subscribed
    pub discarded: usize,
    /// Successful sink deliveries across all broadcasts
    pub delivered: usize,
    /// Sinks dropped during this tick
    pub failed: usize,
}

/// Periodic driver of the dispatch loop
#[derive(Debug)]
pub struct DispatchScheduler {
    period: Duration,
    running: AtomicBool,
}

impl DispatchScheduler {
    /// Create a stopped scheduler
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: AtomicBool::new(false),
        }
    }

    /// Time between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::Acquire) {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Spawn the recurring dispatch task
    ///
    /// The first tick fires one full period after the call.
    pub(crate) fn start(&self, relay: Arc<StationRelay>) -> Result<JoinHandle<()>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }

        let period = self.period;
        let first_tick = Instant::now() + period;
        tracing::info!(period_ms = period.as_millis() as u64, "Dispatch loop started");

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let report = relay.dispatch_tick().await;

                if report.dispatched > 0 || report.discarded > 0 {
                    tracing::debug!(
                        dispatched = report.dispatched,
                        discarded = report.discarded,
                        delivered = report.delivered,
                        failed = report.failed,
                        "Dispatch tick"
                    );
                }
            }
        }))
    }
}
