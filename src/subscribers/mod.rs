//! Subscriber set and sinks
//!
//! Subscribers are live connections that receive pushed messages. The set can
//! grow and shrink while a broadcast is in flight.

pub mod set;
pub mod sink;
pub mod subscription;

pub use set::{BroadcastOutcome, SubscriberSet};
pub use sink::{ChannelSink, MessageSink, SinkError, SubscriberId};
pub use subscription::Subscription;
