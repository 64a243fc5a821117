//! Relay configuration
//!
//! Topic definitions and dispatch timing for a [`StationRelay`](crate::StationRelay).

use std::time::Duration;

/// Default dispatch period
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Default per-subscriber queue depth
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// What a dispatch tick does with a buffered reading when nobody is subscribed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainPolicy {
    /// Pop the reading anyway; it is lost
    #[default]
    Discard,
    /// Leave the reading at the head of the buffer until a subscriber joins
    Retain,
}

/// A known topic: identifier plus display title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDefinition {
    /// Case-sensitive identifier (e.g., "A")
    pub id: String,
    /// Human-readable title (e.g., "Station A")
    pub title: String,
}

impl TopicDefinition {
    /// Create a new topic definition
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Configuration for the relay core
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Known topics, in snapshot and dispatch order
    pub topics: Vec<TopicDefinition>,

    /// Time between dispatch ticks
    pub dispatch_interval: Duration,

    /// Handling of buffered readings when the subscriber set is empty
    pub drain_policy: DrainPolicy,

    /// Queue depth of each subscriber's channel sink
    ///
    /// A subscriber whose queue is full at delivery time is treated as failed.
    pub subscriber_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            topics: vec![
                TopicDefinition::new("A", "Station A"),
                TopicDefinition::new("B", "Station B"),
                TopicDefinition::new("C", "Station C"),
            ],
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
            drain_policy: DrainPolicy::Discard,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl RelayConfig {
    /// Replace the topic set
    ///
    /// Duplicate identifiers are dropped, keeping the first occurrence.
    pub fn topics(mut self, topics: impl IntoIterator<Item = TopicDefinition>) -> Self {
        let mut unique: Vec<TopicDefinition> = Vec::new();
        for topic in topics {
            if !unique.iter().any(|t| t.id == topic.id) {
                unique.push(topic);
            }
        }
        self.topics = unique;
        self
    }

    /// Set the dispatch period
    ///
    /// Zero is bumped to one millisecond; `tokio::time::interval` rejects a zero period.
    pub fn dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the empty-set drain policy
    pub fn drain_policy(mut self, policy: DrainPolicy) -> Self {
        self.drain_policy = policy;
        self
    }

    /// Set per-subscriber queue depth (minimum 1)
    pub fn subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity.max(1);
        self
    }
}
