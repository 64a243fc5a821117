//! End-to-end behavior of the relay core without the HTTP layer

use std::sync::Arc;
use std::time::Duration;

use station_relay::{Message, Reading, RelayConfig, RelayError, StationRelay, TopicStatus};

#[tokio::test]
async fn test_scenario_reading_reaches_subscriber() {
    let relay = StationRelay::new();
    let mut subscription = relay.subscribe().await.unwrap();

    relay.ingest("B", Reading::new(42.0)).await.unwrap();
    relay.dispatch_tick().await;

    let snapshot = subscription.recv().await.unwrap();
    match &*snapshot {
        Message::Snapshot { topics } => {
            assert_eq!(topics.len(), 3);
            assert!(topics.iter().all(|t| t.status == TopicStatus::Inactive));
        }
        other => panic!("expected snapshot first, got {:?}", other),
    }

    assert_eq!(*subscription.recv().await.unwrap(), Message::connected());
    assert_eq!(
        *subscription.recv().await.unwrap(),
        Message::reading(42.0, "B")
    );
    assert_eq!(relay.registry().pending("B").await.unwrap(), 0);
}

#[tokio::test]
async fn test_scenario_unknown_topic_never_delivered() {
    let relay = StationRelay::new();
    let mut subscription = relay.subscribe().await.unwrap();
    subscription.drain();

    let result = relay.ingest("Z", Reading::new(1.0)).await;
    assert_eq!(result, Err(RelayError::InvalidTopic("Z".into())));

    for _ in 0..3 {
        relay.dispatch_tick().await;
    }
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_late_subscriber_gets_next_tick_only() {
    let relay = StationRelay::new();
    let mut early = relay.subscribe().await.unwrap();
    early.drain();

    relay.ingest("A", Reading::new(1.0)).await.unwrap();
    relay.ingest("A", Reading::new(2.0)).await.unwrap();
    relay.dispatch_tick().await;

    let mut late = relay.subscribe().await.unwrap();
    let greeting = late.drain();
    assert_eq!(greeting.len(), 2);

    relay.dispatch_tick().await;

    let early_values: Vec<Message> = early.drain().iter().map(|m| (**m).clone()).collect();
    let late_values: Vec<Message> = late.drain().iter().map(|m| (**m).clone()).collect();
    assert_eq!(
        early_values,
        vec![Message::reading(1.0, "A"), Message::reading(2.0, "A")]
    );
    assert_eq!(late_values, vec![Message::reading(2.0, "A")]);
}

#[tokio::test]
async fn test_dropped_subscription_leaves_set() {
    let relay = StationRelay::new();
    let subscription = relay.subscribe().await.unwrap();
    assert_eq!(relay.subscriber_count(), 1);

    drop(subscription);
    tokio::time::timeout(Duration::from_secs(1), async {
        while relay.subscriber_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    let result = relay.ingest("A", Reading::new(1.0)).await;
    assert_eq!(result, Err(RelayError::NoSubscribers));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_leave_during_dispatch() {
    let relay = Arc::new(StationRelay::with_config(
        RelayConfig::default().subscriber_capacity(1024),
    ));
    let mut anchor = relay.subscribe().await.unwrap();
    anchor.drain();

    for i in 0..50 {
        relay.ingest("C", Reading::new(i as f64)).await.unwrap();
    }

    let churn = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            for _ in 0..100 {
                let subscription = relay.subscribe().await.unwrap();
                relay.unsubscribe(subscription.id()).await;
            }
        })
    };

    let dispatch = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            for _ in 0..50 {
                relay.dispatch_tick().await;
                tokio::task::yield_now().await;
            }
        })
    };

    churn.await.unwrap();
    dispatch.await.unwrap();

    // Anchor saw every reading exactly once, in order
    let values: Vec<f64> = anchor
        .drain()
        .iter()
        .filter_map(|m| match &**m {
            Message::Reading { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    let expected: Vec<f64> = (0..50).map(|i| i as f64).collect();
    assert_eq!(values, expected);
    assert_eq!(relay.subscriber_count(), 1);
}
