//! Configuration for SBDP servers
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Result, SbdpError};

/// Main configuration for an SBDP server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Listener Configuration
    // -------------------------------------------------------------------------
    /// TCP port to bind on all IPv4 interfaces (0 = ephemeral)
    pub port: u16,

    /// Pending connection queue length passed to listen
    pub backlog: i32,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads serving accepted connections
    pub workers: usize,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Per-chunk receive timeout (milliseconds, 0 = block indefinitely)
    pub recv_timeout_ms: u64,

    /// Largest payload a peer may declare, None = unbounded
    pub max_payload_len: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9000,
            backlog: 128,
            workers: 4,
            recv_timeout_ms: 0,
            max_payload_len: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Receive timeout as a Duration (zero means blocking)
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SbdpError::Config("workers must be at least 1".to_string()));
        }
        if self.backlog <= 0 {
            return Err(SbdpError::Config(format!(
                "backlog must be positive, got {}",
                self.backlog
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the per-chunk receive timeout (in milliseconds)
    pub fn recv_timeout_ms(mut self, ms: u64) -> Self {
        self.config.recv_timeout_ms = ms;
        self
    }

    /// Cap the payload length accepted from peers
    pub fn max_payload_len(mut self, max: Option<u32>) -> Self {
        self.config.max_payload_len = max;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
