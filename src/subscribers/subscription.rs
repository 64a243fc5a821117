//! Subscriber-side handle
//!
//! A [`Subscription`] is what a transport holds while a client is connected.
//! It yields messages as a stream and unregisters itself when dropped.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_stream::Stream;

use crate::message::Message;

use super::set::SubscriberSet;
use super::sink::SubscriberId;

/// Receiving end of one subscriber
///
/// The snapshot and connection confirmation are already queued when the
/// subscription is handed out. Dropping it removes the subscriber from the set
/// (scheduled on the current tokio runtime).
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<Message>>,
    set: Weak<SubscriberSet>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::Receiver<Arc<Message>>,
        set: Weak<SubscriberSet>,
    ) -> Self {
        Self { id, rx, set }
    }

    /// Handle used to unsubscribe
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next message
    ///
    /// Returns `None` once the subscriber has been removed from the set and
    /// all queued messages were consumed.
    pub async fn recv(&mut self) -> Option<Arc<Message>> {
        self.rx.recv().await
    }

    /// Take a queued message without waiting
    pub fn try_recv(&mut self) -> Option<Arc<Message>> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every message queued right now
    pub fn drain(&mut self) -> Vec<Arc<Message>> {
        let mut messages = Vec::new();
        while let Some(message) = self.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl Stream for Subscription {
    type Item = Arc<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(set) = self.set.upgrade() else {
            return;
        };
        let id = self.id;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    set.remove(id).await;
                });
            }
            Err(_) => {
                set.try_remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::subscribers::sink::ChannelSink;

    async fn subscribed(set: &Arc<SubscriberSet>) -> Subscription {
        let (sink, rx) = ChannelSink::channel(8);
        let id = set.add(Arc::new(sink)).await;
        Subscription::new(id, rx, Arc::downgrade(set))
    }

    #[tokio::test]
    async fn test_stream_yields_broadcasts() {
        let set = Arc::new(SubscriberSet::new());
        let mut subscription = subscribed(&set).await;

        set.broadcast(Arc::new(Message::reading(3.0, "A"))).await;

        let message = subscription.next().await.unwrap();
        assert_eq!(*message, Message::reading(3.0, "A"));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let set = Arc::new(SubscriberSet::new());
        let subscription = subscribed(&set).await;
        let id = subscription.id();

        drop(subscription);
        // Let the spawned removal run
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert!(!set.contains(id).await);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_drain() {
        let set = Arc::new(SubscriberSet::new());
        let mut subscription = subscribed(&set).await;

        set.broadcast(Arc::new(Message::reading(1.0, "A"))).await;
        set.broadcast(Arc::new(Message::reading(2.0, "A"))).await;

        let messages = subscription.drain();
        assert_eq!(messages.len(), 2);
        assert!(subscription.try_recv().is_none());
    }
}
