//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default interval between keep-alive comments on idle event streams
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Allow requests from any origin
    pub cors_permissive: bool,

    /// Idle time before a keep-alive comment is written to an event stream
    pub keep_alive: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            cors_permissive: true,
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the keep-alive interval for event streams
    pub fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval.max(Duration::from_millis(1));
        self
    }

    /// Turn off the permissive CORS layer
    pub fn disable_cors(mut self) -> Self {
        self.cors_permissive = false;
        self
    }
}
