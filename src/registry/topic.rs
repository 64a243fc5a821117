//! Topic entry and state types
//!
//! This module defines the per-topic state stored in the registry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use super::config::TopicDefinition;

/// A single measurement submitted by a producer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Measured value
    #[serde(alias = "ppm")]
    pub value: f64,
}

impl Reading {
    /// Create a new reading
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// Derived status of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    /// Has pending readings or has been marked online by an ingest
    Active,
    /// Never received a reading
    Inactive,
}

/// Mutable part of a topic, guarded by the entry's mutex
#[derive(Debug, Default)]
pub struct TopicState {
    /// Pending readings, oldest first
    buffer: VecDeque<Reading>,

    /// Set by every successful ingest, never cleared
    online: bool,
}

impl TopicState {
    /// Append a reading to the tail and mark the topic online
    ///
    /// Returns the buffer length after the append.
    pub fn push(&mut self, reading: Reading) -> usize {
        self.buffer.push_back(reading);
        self.online = true;
        self.buffer.len()
    }

    /// Remove the oldest reading
    pub fn pop(&mut self) -> Option<Reading> {
        self.buffer.pop_front()
    }

    /// Number of pending readings
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Whether any reading is waiting
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Status: online flag OR non-empty buffer
    pub fn status(&self) -> TopicStatus {
        if self.online || self.has_pending() {
            TopicStatus::Active
        } else {
            TopicStatus::Inactive
        }
    }
}

/// Entry for a single topic in the registry
#[derive(Debug)]
pub struct TopicEntry {
    id: String,
    title: String,
    state: Mutex<TopicState>,
}

impl TopicEntry {
    /// Create an empty, inactive topic
    pub(super) fn new(definition: TopicDefinition) -> Self {
        Self {
            id: definition.id,
            title: definition.title,
            state: Mutex::new(TopicState::default()),
        }
    }

    /// Topic identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lock the topic's buffer and flags
    ///
    /// Hold the guard only for the duration of a single mutation.
    pub async fn lock(&self) -> MutexGuard<'_, TopicState> {
        self.state.lock().await
    }

    /// Current status
    pub async fn status(&self) -> TopicStatus {
        self.state.lock().await.status()
    }

    /// Build the snapshot row for this topic
    pub async fn snapshot(&self) -> TopicSnapshot {
        TopicSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status().await,
        }
    }
}

/// One row of the snapshot sent to new subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSnapshot {
    /// Topic identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Derived status at snapshot time
    pub status: TopicStatus,
}
