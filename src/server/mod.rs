//! HTTP/SSE front end
//!
//! Thin adapter over [`StationRelay`](crate::StationRelay): producers POST
//! readings, consumers hold a `text/event-stream` open on `/data`.

pub mod config;
pub mod listener;
pub mod routes;

pub use config::ServerConfig;
pub use listener::RelayServer;
pub use routes::create_router;
