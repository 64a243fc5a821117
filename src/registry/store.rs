//! Topic registry implementation
//!
//! Fixed set of topics created at startup. Membership never changes, so the
//! registry itself needs no lock; each topic guards its own buffer.

use super::config::RelayConfig;
use super::error::RelayError;
use super::topic::{TopicEntry, TopicSnapshot, TopicStatus};

/// Registry of all known topics
#[derive(Debug)]
pub struct TopicRegistry {
    /// Topics in configured order
    topics: Vec<TopicEntry>,
}

impl TopicRegistry {
    /// Create a registry with the default topics (A, B, C)
    pub fn new() -> Self {
        Self::with_config(&RelayConfig::default())
    }

    /// Create a registry from the configured topic definitions
    pub fn with_config(config: &RelayConfig) -> Self {
        let topics = config
            .topics
            .iter()
            .cloned()
            .map(TopicEntry::new)
            .collect();

        Self { topics }
    }

    /// Look up a topic by identifier (case-sensitive)
    pub fn lookup(&self, id: &str) -> Result<&TopicEntry, RelayError> {
        self.topics
            .iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| RelayError::InvalidTopic(id.to_string()))
    }

    /// Check whether an identifier is known
    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_ok()
    }

    /// Derived status of a topic
    pub async fn status(&self, id: &str) -> Result<TopicStatus, RelayError> {
        Ok(self.lookup(id)?.status().await)
    }

    /// Number of pending readings in a topic's buffer
    pub async fn pending(&self, id: &str) -> Result<usize, RelayError> {
        Ok(self.lookup(id)?.lock().await.pending())
    }

    /// Status of every topic, in registry order
    pub async fn snapshot(&self) -> Vec<TopicSnapshot> {
        let mut rows = Vec::with_capacity(self.topics.len());
        for topic in &self.topics {
            rows.push(topic.snapshot().await);
        }
        rows
    }

    /// Iterate topics in registry order
    pub fn iter(&self) -> impl Iterator<Item = &TopicEntry> {
        self.topics.iter()
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the registry has no topics
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
