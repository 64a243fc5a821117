//! Topic registry
//!
//! The registry holds the fixed set of topics ("stations") known to the relay.
//! Each topic owns a FIFO buffer of pending readings and an online flag.
//!
//! # Architecture
//!
//! ```text
//!                         TopicRegistry
//!                 ┌──────────────────────────┐
//!                 │ topics: Vec<TopicEntry { │
//!                 │   id, title,             │
//!                 │   state: Mutex<{         │
//!                 │     buffer: VecDeque,    │
//!                 │     online: bool,        │
//!                 │   }>                     │
//!                 │ }>                       │
//!                 └────────────┬─────────────┘
//!                              │
//!            ┌─────────────────┴─────────────────┐
//!            │                                   │
//!            ▼                                   ▼
//!     relay.ingest()                      relay.dispatch_tick()
//!     push_back + online                  pop_front, one per topic
//! ```
//!
//! Membership is fixed at construction; there is no dynamic topic creation.

pub mod config;
pub mod error;
pub mod store;
pub mod topic;

pub use config::{DrainPolicy, RelayConfig, TopicDefinition};
pub use error::RelayError;
pub use store::TopicRegistry;
pub use topic::{Reading, TopicEntry, TopicSnapshot, TopicState, TopicStatus};
