//! Statistics for the relay

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters updated by the relay
#[derive(Debug)]
pub struct RelayMetrics {
    started_at: Instant,
    readings_accepted: AtomicU64,
    rejected_invalid_topic: AtomicU64,
    rejected_no_subscribers: AtomicU64,
    readings_dispatched: AtomicU64,
    readings_discarded: AtomicU64,
    messages_delivered: AtomicU64,
    delivery_failures: AtomicU64,
    total_subscribers: AtomicU64,
    ticks: AtomicU64,
}

impl RelayMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            readings_accepted: AtomicU64::new(0),
            rejected_invalid_topic: AtomicU64::new(0),
            rejected_no_subscribers: AtomicU64::new(0),
            readings_dispatched: AtomicU64::new(0),
            readings_discarded: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            total_subscribers: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.readings_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_topic(&self) {
        self.rejected_invalid_topic.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_no_subscribers(&self) {
        self.rejected_no_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_subscriber(&self) {
        self.total_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tick(&self, dispatched: u64, discarded: u64, delivered: u64, failed: u64) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.readings_dispatched.fetch_add(dispatched, Ordering::Relaxed);
        self.readings_discarded.fetch_add(discarded, Ordering::Relaxed);
        self.messages_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.delivery_failures.fetch_add(failed, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters
    pub fn snapshot(&self, active_subscribers: usize) -> RelayStats {
        RelayStats {
            readings_accepted: self.readings_accepted.load(Ordering::Relaxed),
            rejected_invalid_topic: self.rejected_invalid_topic.load(Ordering::Relaxed),
            rejected_no_subscribers: self.rejected_no_subscribers.load(Ordering::Relaxed),
            readings_dispatched: self.readings_dispatched.load(Ordering::Relaxed),
            readings_discarded: self.readings_discarded.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            total_subscribers: self.total_subscribers.load(Ordering::Relaxed),
            active_subscribers: active_subscribers as u64,
            ticks: self.ticks.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Readings appended to a topic buffer
    pub readings_accepted: u64,
    /// Ingests rejected for an unknown topic
    pub rejected_invalid_topic: u64,
    /// Ingests rejected because nobody was subscribed
    pub rejected_no_subscribers: u64,
    /// Readings popped and broadcast
    pub readings_dispatched: u64,
    /// Readings popped with no subscribers and lost
    pub readings_discarded: u64,
    /// Individual sink deliveries that succeeded
    pub messages_delivered: u64,
    /// Sinks dropped after a failed delivery
    pub delivery_failures: u64,
    /// Subscribers ever connected
    pub total_subscribers: u64,
    /// Currently connected subscribers
    pub active_subscribers: u64,
    /// Dispatch ticks run
    pub ticks: u64,
    /// Time since the relay was created
    pub uptime: Duration,
}

impl RelayStats {
    /// Ingest attempts rejected for any reason
    pub fn rejected(&self) -> u64 {
        self.rejected_invalid_topic + self.rejected_no_subscribers
    }

    /// Readings accepted but not yet popped
    pub fn backlog(&self) -> u64 {
        self.readings_accepted
            .saturating_sub(self.readings_dispatched + self.readings_discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let stats = RelayMetrics::new().snapshot(0);

        assert_eq!(stats.readings_accepted, 0);
        assert_eq!(stats.rejected(), 0);
        assert_eq!(stats.ticks, 0);
        assert_eq!(stats.active_subscribers, 0);
    }

    #[test]
    fn test_metrics_record() {
        let metrics = RelayMetrics::new();

        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_invalid_topic();
        metrics.record_no_subscribers();
        metrics.record_subscriber();
        metrics.record_tick(1, 1, 4, 1);

        let stats = metrics.snapshot(3);
        assert_eq!(stats.readings_accepted, 3);
        assert_eq!(stats.rejected(), 2);
        assert_eq!(stats.readings_dispatched, 1);
        assert_eq!(stats.readings_discarded, 1);
        assert_eq!(stats.backlog(), 1);
        assert_eq!(stats.messages_delivered, 4);
        assert_eq!(stats.delivery_failures, 1);
        assert_eq!(stats.total_subscribers, 1);
        assert_eq!(stats.active_subscribers, 3);
        assert_eq!(stats.ticks, 1);
    }
}
