//! Output sinks
//!
//! A sink is the delivery end of one subscriber. Delivery never blocks: a sink
//! either accepts the message immediately or reports a failure, and the
//! subscriber set drops failed sinks.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::message::Message;

/// Unique handle of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Reason a delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side has gone away
    Closed,
    /// The receiver is not keeping up and its queue is full
    Lagging,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Closed => write!(f, "Sink closed"),
            SinkError::Lagging => write!(f, "Sink queue full"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Destination for messages pushed to one subscriber
pub trait MessageSink: Send + Sync + 'static {
    /// Hand a message to the sink without waiting
    fn deliver(&self, message: Arc<Message>) -> Result<(), SinkError>;

    /// Whether the sink is known to be dead
    ///
    /// Lets the broadcaster skip a delivery it knows will fail.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sink backed by a bounded `mpsc` channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<Message>>,
}

impl ChannelSink {
    /// Wrap an existing sender
    pub fn new(tx: mpsc::Sender<Arc<Message>>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiver paired with it
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<Message>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl MessageSink for ChannelSink {
    fn deliver(&self, message: Arc<Message>) -> Result<(), SinkError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Lagging,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
