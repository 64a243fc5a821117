//! Relay service
//!
//! [`StationRelay`] owns the topic registry and the subscriber set and exposes
//! the two core interfaces: ingestion (`ingest`) and subscription
//! (`subscribe` / `unsubscribe`). The periodic drain lives in
//! [`dispatch_tick`](StationRelay::dispatch_tick), driven by the scheduler.
//!
//! Share one instance as `Arc<StationRelay>` between the transport and the
//! dispatch task; there is no global state.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::Result;
use crate::message::Message;
use crate::registry::{DrainPolicy, Reading, RelayConfig, RelayError, TopicRegistry};
use crate::scheduler::{DispatchScheduler, SchedulerState, TickReport};
use crate::stats::{RelayMetrics, RelayStats};
use crate::subscribers::{
    ChannelSink, MessageSink, SinkError, SubscriberId, SubscriberSet, Subscription,
};

/// Messages queued on every new subscriber before it joins the set
const GREETING_LEN: usize = 2;

/// Confirmation returned for an accepted reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Topic the reading was appended to
    pub topic_id: String,
    /// Buffer length after the append
    pub pending: usize,
}

/// The relay core
#[derive(Debug)]
pub struct StationRelay {
    config: RelayConfig,
    registry: TopicRegistry,
    subscribers: Arc<SubscriberSet>,
    scheduler: DispatchScheduler,
    metrics: RelayMetrics,
}

impl StationRelay {
    /// Create a relay with the default topics and a 5 second period
    pub fn new() -> Self {
        Self::with_config(RelayConfig::default())
    }

    /// Create a relay with custom configuration
    pub fn with_config(config: RelayConfig) -> Self {
        Self {
            registry: TopicRegistry::with_config(&config),
            subscribers: Arc::new(SubscriberSet::new()),
            scheduler: DispatchScheduler::new(config.dispatch_interval),
            metrics: RelayMetrics::new(),
            config,
        }
    }

    /// Get the relay configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Get the topic registry
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Get the subscriber set
    pub fn subscribers(&self) -> &Arc<SubscriberSet> {
        &self.subscribers
    }

    /// Number of connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Accept a reading for a topic
    ///
    /// Fails with `InvalidTopic` for an unknown identifier and with
    /// `NoSubscribers` when nobody is listening; neither touches a buffer.
    /// On success the reading is queued for the next dispatch tick.
    pub async fn ingest(
        &self,
        topic_id: &str,
        reading: Reading,
    ) -> std::result::Result<Ack, RelayError> {
        let topic = match self.registry.lookup(topic_id) {
            Ok(topic) => topic,
            Err(e) => {
                self.metrics.record_invalid_topic();
                tracing::warn!(topic = %topic_id, "Reading rejected: unknown topic");
                return Err(e);
            }
        };

        if self.subscribers.is_empty() {
            self.metrics.record_no_subscribers();
            tracing::debug!(topic = %topic_id, "No subscribers connected, reading dropped");
            return Err(RelayError::NoSubscribers);
        }

        let pending = topic.lock().await.push(reading);
        self.metrics.record_accepted();

        tracing::info!(
            topic = %topic_id,
            value = reading.value,
            pending = pending,
            "Reading received"
        );

        Ok(Ack {
            topic_id: topic.id().to_string(),
            pending,
        })
    }

    /// Run one dispatch pass
    ///
    /// For every topic in registry order, pops at most one reading and
    /// broadcasts it. With no subscribers the reading is discarded or kept
    /// according to [`DrainPolicy`].
    pub async fn dispatch_tick(&self) -> TickReport {
        let mut report = TickReport::default();

        for topic in self.registry.iter() {
            let reading = {
                let mut state = topic.lock().await;
                if !state.has_pending() {
                    continue;
                }
                if self.subscribers.is_empty() && self.config.drain_policy == DrainPolicy::Retain {
                    continue;
                }
                state.pop()
            };

            let Some(reading) = reading else {
                continue;
            };

            if self.subscribers.is_empty() {
                report.discarded += 1;
                tracing::debug!(
                    topic = %topic.id(),
                    value = reading.value,
                    "No subscribers, reading discarded"
                );
                continue;
            }

            let message = Arc::new(Message::reading(reading.value, topic.id()));
            let outcome = self.subscribers.broadcast(message).await;

            report.dispatched += 1;
            report.delivered += outcome.delivered;
            report.failed += outcome.failed.len();

            tracing::debug!(
                topic = %topic.id(),
                value = reading.value,
                delivered = outcome.delivered,
                "Reading dispatched"
            );
        }

        self.metrics.record_tick(
            report.dispatched as u64,
            report.discarded as u64,
            report.delivered as u64,
            report.failed as u64,
        );

        report
    }

    /// Connect a new subscriber backed by a channel
    ///
    /// The returned subscription already holds the topic snapshot followed by
    /// the connection confirmation.
    pub async fn subscribe(&self) -> std::result::Result<Subscription, SinkError> {
        let (sink, rx) = ChannelSink::channel(self.config.subscriber_capacity + GREETING_LEN);
        let id = self.subscribe_with(Arc::new(sink)).await?;

        Ok(Subscription::new(id, rx, Arc::downgrade(&self.subscribers)))
    }

    /// Connect a caller-provided sink
    ///
    /// Sends the snapshot and confirmation to the sink before any broadcast
    /// can reach it.
    pub async fn subscribe_with(
        &self,
        sink: Arc<dyn MessageSink>,
    ) -> std::result::Result<SubscriberId, SinkError> {
        let greeting = [
            Arc::new(Message::snapshot(self.registry.snapshot().await)),
            Arc::new(Message::connected()),
        ];

        let id = self.subscribers.add_with_greeting(sink, &greeting).await?;
        self.metrics.record_subscriber();

        tracing::info!(
            subscriber = %id,
            subscribers = self.subscribers.len(),
            "Subscriber connected"
        );

        Ok(id)
    }

    /// Disconnect a subscriber
    ///
    /// Returns `false` if it was already removed.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(id).await;
        if removed {
            tracing::info!(
                subscriber = %id,
                subscribers = self.subscribers.len(),
                "Subscriber disconnected"
            );
        }
        removed
    }

    /// Start the recurring dispatch task
    ///
    /// Fails with [`Error::AlreadyRunning`](crate::Error::AlreadyRunning) on a second call.
    pub fn start_dispatch(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        self.scheduler.start(Arc::clone(self))
    }

    /// Dispatch loop state
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Point-in-time statistics
    pub fn stats(&self) -> RelayStats {
        self.metrics.snapshot(self.subscribers.len())
    }
}

impl Default for StationRelay {
    fn default() -> Self {
        Self::new()
    }
}
