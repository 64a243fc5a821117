//! Subscriber set implementation
//!
//! Concurrency-safe collection of active sinks. Broadcasting clones the sink
//! list under a read lock and delivers outside of it, so add/remove never
//! wait on a slow fan-out and never mutate a list that is being iterated.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::message::Message;

use super::sink::{MessageSink, SinkError, SubscriberId};

type SinkList = Vec<(SubscriberId, Arc<dyn MessageSink>)>;

/// Result of a single broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Sinks that accepted the message
    pub delivered: usize,
    /// Sinks that failed and were removed
    pub failed: Vec<SubscriberId>,
}

/// Set of currently connected subscribers
pub struct SubscriberSet {
    /// Registered sinks in join order
    sinks: RwLock<SinkList>,

    /// Mirrors `sinks.len()`; readable without the lock
    count: AtomicUsize,

    /// Next subscriber ID to hand out
    next_id: AtomicU64,
}

impl SubscriberSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
            count: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> SubscriberId {
        SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a sink
    pub async fn add(&self, sink: Arc<dyn MessageSink>) -> SubscriberId {
        let id = self.allocate_id();
        let mut sinks = self.sinks.write().await;

        sinks.push((id, sink));
        self.count.store(sinks.len(), Ordering::Release);

        tracing::debug!(subscriber = %id, subscribers = sinks.len(), "Subscriber added");
        id
    }

    /// Register a sink and push `greeting` to it before any broadcast can reach it
    ///
    /// The greeting is delivered while the write lock is held, so a concurrent
    /// broadcast either finished before registration or starts after the
    /// greeting is queued. If the sink rejects the greeting it is not registered.
    pub async fn add_with_greeting(
        &self,
        sink: Arc<dyn MessageSink>,
        greeting: &[Arc<Message>],
    ) -> Result<SubscriberId, SinkError> {
        let id = self.allocate_id();
        let mut sinks = self.sinks.write().await;

        for message in greeting {
            sink.deliver(Arc::clone(message))?;
        }

        sinks.push((id, sink));
        self.count.store(sinks.len(), Ordering::Release);

        tracing::debug!(subscriber = %id, subscribers = sinks.len(), "Subscriber added");
        Ok(id)
    }

    /// Remove a sink
    ///
    /// Returns `false` if it was already gone.
    pub async fn remove(&self, id: SubscriberId) -> bool {
        let mut sinks = self.sinks.write().await;
        Self::remove_locked(&mut sinks, &self.count, id)
    }

    /// Remove a sink without waiting for the lock
    ///
    /// Used where no runtime is available. Returns `false` if the lock was
    /// contended or the sink was already gone; a dead sink left behind is
    /// dropped by the next failing broadcast.
    pub fn try_remove(&self, id: SubscriberId) -> bool {
        match self.sinks.try_write() {
            Ok(mut sinks) => Self::remove_locked(&mut sinks, &self.count, id),
            Err(_) => false,
        }
    }

    fn remove_locked(sinks: &mut SinkList, count: &AtomicUsize, id: SubscriberId) -> bool {
        let before = sinks.len();
        sinks.retain(|(sid, _)| *sid != id);
        count.store(sinks.len(), Ordering::Release);

        let removed = sinks.len() != before;
        if removed {
            tracing::debug!(subscriber = %id, subscribers = sinks.len(), "Subscriber removed");
        }
        removed
    }

    /// Send a message to every registered sink
    ///
    /// Iterates a snapshot taken at the start of the call. Sinks that fail are
    /// removed and delivery continues with the rest.
    pub async fn broadcast(&self, message: Arc<Message>) -> BroadcastOutcome {
        let snapshot: SinkList = self.sinks.read().await.clone();

        let mut outcome = BroadcastOutcome::default();
        for (id, sink) in &snapshot {
            let result = if sink.is_closed() {
                Err(SinkError::Closed)
            } else {
                sink.deliver(Arc::clone(&message))
            };

            match result {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        subscriber = %id,
                        error = %e,
                        "Delivery failed, dropping subscriber"
                    );
                    outcome.failed.push(*id);
                }
            }
        }

        if !outcome.failed.is_empty() {
            let mut sinks = self.sinks.write().await;
            sinks.retain(|(id, _)| !outcome.failed.contains(id));
            self.count.store(sinks.len(), Ordering::Release);
        }

        outcome
    }

    /// Whether a subscriber is registered
    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.sinks.read().await.iter().any(|(sid, _)| *sid == id)
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("len", &self.len())
            .finish()
    }
}
