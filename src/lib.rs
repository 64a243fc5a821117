//! Station reading relay
//!
//! Producers submit readings for a fixed set of topics ("stations"); the relay
//! buffers them per topic and a periodic dispatch loop pushes one reading per
//! topic per tick to every connected subscriber.
//!
//! ```text
//!   POST /  ──► StationRelay::ingest ──► topic FIFO
//!                                            │  one pop per topic per tick
//!                                            ▼
//!                         StationRelay::dispatch_tick
//!                                            │
//!                                            ▼
//!                     SubscriberSet::broadcast ──► sinks ──► GET /data (SSE)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use station_relay::{RelayServer, ServerConfig};
//!
//! # async fn example() -> station_relay::error::Result<()> {
//! let server = RelayServer::new(ServerConfig::default());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The core can be driven without HTTP:
//!
//! ```
//! use station_relay::{Message, Reading, StationRelay};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let relay = StationRelay::new();
//! let mut subscription = relay.subscribe().await.unwrap();
//! subscription.drain(); // snapshot + confirmation
//!
//! relay.ingest("B", Reading::new(42.0)).await.unwrap();
//! relay.dispatch_tick().await;
//!
//! let message = subscription.recv().await.unwrap();
//! assert_eq!(*message, Message::reading(42.0, "B"));
//! # }
//! ```

pub mod error;
pub mod message;
pub mod registry;
pub mod relay;
pub mod scheduler;
pub mod server;
pub mod stats;
pub mod subscribers;

pub use error::{Error, Result};
pub use message::Message;
pub use registry::{DrainPolicy, Reading, RelayConfig, RelayError, TopicDefinition, TopicStatus};
pub use relay::{Ack, StationRelay};
pub use scheduler::{SchedulerState, TickReport};
pub use server::{RelayServer, ServerConfig};
pub use stats::RelayStats;
pub use subscribers::{MessageSink, SinkError, SubscriberId, Subscription};
