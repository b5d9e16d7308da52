//! Connection Handler
//!
//! Serves a single accepted connection: receive a message, hand it to
//! the handler, send the reply (if any), repeat until the peer leaves.

use std::sync::Arc;
use std::time::Duration;

use super::framing::{recv_message, recv_message_with_limit, send_message};
use super::server::Handler;
use super::Socket;
use crate::config::Config;
use crate::error::{Result, SbdpError};
use crate::protocol::Message;

/// Handles a single client connection
pub struct Connection {
    /// Accepted socket, shared with the server's shutdown registry
    socket: Arc<Socket>,

    /// Per-chunk receive timeout (zero = block)
    recv_timeout: Duration,

    /// Ceiling on peer-declared payload length
    max_payload_len: Option<u32>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(socket: Arc<Socket>, config: &Config) -> Self {
        let peer_addr = socket.peer_address();
        Self {
            socket,
            recv_timeout: config.recv_timeout(),
            max_payload_len: config.max_payload_len,
            peer_addr,
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns Ok when the client disconnects, goes idle past the
    /// timeout, or the server shuts down.
    pub fn handle<H: Handler + ?Sized>(&self, handler: &H) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match self.read_message() {
                Ok(message) => message,
                Err(e) if e.is_cancelled() => {
                    tracing::debug!("Connection to {} cancelled by shutdown", self.peer_addr);
                    return Ok(());
                }
                Err(e) if e.is_peer_closed() => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(SbdpError::Format(e)) => {
                    // The whole frame was consumed, so the stream is still aligned
                    tracing::warn!("Malformed message from {}: {}", self.peer_addr, e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!(
                "Received message from {}: {:?}",
                self.peer_addr,
                request.keys().collect::<Vec<_>>()
            );

            let Some(response) = handler.handle(&self.peer_addr, request) else {
                continue;
            };

            if let Err(e) = send_message(&self.socket, &response) {
                if e.is_peer_closed() || e.is_cancelled() {
                    tracing::debug!(
                        "Client {} gone before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    fn read_message(&self) -> Result<Message> {
        match self.max_payload_len {
            Some(max) => recv_message_with_limit(&self.socket, self.recv_timeout, max),
            None => recv_message(&self.socket, self.recv_timeout),
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
