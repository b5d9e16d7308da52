//! SBDP Server Binary
//!
//! Runs an echo server: every message received is logged and sent back.

use clap::Parser;
use sbdp::network::Server;
use sbdp::{Config, Message};
use tracing_subscriber::{fmt, EnvFilter};

/// SBDP echo server
#[derive(Parser, Debug)]
#[command(name = "sbdp-server")]
#[command(about = "Simple Binary Dictionary Protocol echo server")]
#[command(version)]
struct Args {
    /// TCP port to listen on
    #[arg(short, long, default_value = "9000")]
    port: u16,

    /// Listen backlog
    #[arg(short, long, default_value = "128")]
    backlog: i32,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Per-chunk receive timeout in milliseconds (0 = wait forever)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,

    /// Reject messages whose declared payload exceeds this many bytes
    #[arg(short, long)]
    max_payload: Option<u32>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sbdp=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SBDP Server v{}", sbdp::VERSION);

    let config = Config::builder()
        .port(args.port)
        .backlog(args.backlog)
        .workers(args.workers)
        .recv_timeout_ms(args.timeout_ms)
        .max_payload_len(args.max_payload)
        .build();

    let server = match Server::bind(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let echo = |peer: &str, request: Message| {
        for (key, value) in &request {
            tracing::info!("{} -> {} = {}", peer, key, value);
        }
        Some(request)
    };

    if let Err(e) = server.run(echo) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
