//! Station relay server example
//!
//! Run with: cargo run --example relay_server [BIND_ADDR] [PERIOD_MS]
//!
//! Examples:
//!   cargo run --example relay_server                     # binds to 0.0.0.0:3000, 5s ticks
//!   cargo run --example relay_server localhost           # binds to 127.0.0.1:3000
//!   cargo run --example relay_server 127.0.0.1:3001 1000 # 1s ticks
//!
//! ## Subscribe
//!
//!   curl -N http://localhost:3000/data
//!
//! ## Publish a reading
//!
//!   curl -X POST -H 'Content-Type: application/json' \
//!        -d '{"id":"B","value":42}' http://localhost:3000/
//!
//! A reading is only accepted while at least one subscriber is connected.

use std::net::SocketAddr;
use std::time::Duration;

use station_relay::server::config::DEFAULT_PORT;
use station_relay::{RelayConfig, RelayServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:3000
/// - "localhost:3001" -> 127.0.0.1:3001
/// - "127.0.0.1" -> 127.0.0.1:3000
/// - "0.0.0.0:3000" -> 0.0.0.0:3000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: relay_server [BIND_ADDR] [PERIOD_MS]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:3000)");
    eprintln!("  PERIOD_MS    Dispatch period in milliseconds (default: 5000)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    let mut relay_config = RelayConfig::default();
    if let Some(period) = args.get(2) {
        let millis: u64 = period.parse()?;
        relay_config = relay_config.dispatch_interval(Duration::from_millis(millis));
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("station_relay=debug".parse()?)
                .add_directive("relay_server=info".parse()?),
        )
        .init();

    println!("Starting station relay on http://{}", config.bind_addr);
    println!("Subscribe: curl -N http://{}/data", config.bind_addr);
    println!();

    let server = RelayServer::with_relay_config(config, relay_config);
    let relay = server.relay().clone();

    // Periodic stats
    let stats_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            ticker.tick().await;
            let stats = relay.stats();
            tracing::info!(
                subscribers = stats.active_subscribers,
                accepted = stats.readings_accepted,
                rejected = stats.rejected(),
                dispatched = stats.readings_dispatched,
                backlog = stats.backlog(),
                "Relay stats"
            );
        }
    });

    let result = server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await;

    stats_task.abort();

    if let Err(e) = result {
        eprintln!("Server error: {}", e);
    }

    Ok(())
}
