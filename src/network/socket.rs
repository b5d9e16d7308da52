//! Transport Socket
//!
//! A single-owner TCP endpoint with the classic lifecycle:
//!
//! ```text
//! server:  create → bind(port) → listen(backlog) → accept() → Socket
//! client:  create → connect(host, port)
//! ```
//!
//! Data operations are all-or-nothing over the requested byte count.
//! `shutdown()` may be called from another thread while an operation
//! is blocked: it raises a sticky flag and shuts the OS socket down so
//! the pending call returns, reporting `SbdpError::Cancelled`.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{framing, sys};
use crate::error::{Result, SbdpError};
use crate::protocol::Message;

/// Returned by `peer_address` when the remote endpoint is unknown
pub const PEER_ADDRESS_UNAVAILABLE: &str = "[error retrieving address]";

/// Underlying OS resource for each lifecycle stage
#[derive(Debug)]
enum Handle {
    /// Created, nothing bound or connected yet
    Fresh,

    /// Bound listener; `listening` once listen() has been called
    Listener { listener: TcpListener, listening: bool },

    /// Connected stream (client side or accepted)
    Connected(TcpStream),

    /// Released by close()
    Closed,
}

/// A move-only connection endpoint
///
/// Not `Clone`: exactly one owner holds the OS handle. Share across
/// threads by reference (or `Arc`) when another thread must be able to
/// call `shutdown()`.
#[derive(Debug)]
pub struct Socket {
    handle: Handle,
    shutdown: AtomicBool,
}

impl Default for Socket {
    fn default() -> Self {
        Self::create()
    }
}

impl Socket {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create an unbound, unconnected socket
    pub fn create() -> Self {
        Self {
            handle: Handle::Fresh,
            shutdown: AtomicBool::new(false),
        }
    }

    fn from_stream(stream: TcpStream) -> Self {
        Self {
            handle: Handle::Connected(stream),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Bind to `port` on all IPv4 interfaces (0 picks an ephemeral port)
    pub fn bind(&mut self, port: u16) -> Result<()> {
        if !matches!(self.handle, Handle::Fresh) {
            return Err(self.wrong_state("bind"));
        }

        let listener = TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        tracing::debug!("Bound listener on {}", listener.local_addr()?);

        self.handle = Handle::Listener {
            listener,
            listening: false,
        };
        Ok(())
    }

    /// Start accepting connections with the given backlog
    pub fn listen(&mut self, backlog: i32) -> Result<()> {
        if let Handle::Listener {
            listener,
            listening,
        } = &mut self.handle
        {
            sys::listen(listener, backlog)?;
            *listening = true;
            tracing::debug!("Listening with backlog {}", backlog);
            return Ok(());
        }
        Err(self.wrong_state("listen"))
    }

    /// Block until a peer connects
    ///
    /// Fails with `Cancelled` if the socket is (or becomes) shut down.
    pub fn accept(&self) -> Result<Socket> {
        let listener = match &self.handle {
            Handle::Listener {
                listener,
                listening: true,
            } => listener,
            _ => return Err(self.wrong_state("accept")),
        };

        loop {
            self.check_shutdown()?;

            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("Accepted connection from {}", addr);
                    stream.set_nodelay(true)?;
                    return Ok(Socket::from_stream(stream));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_failure(e)),
            }
        }
    }

    /// Resolve `host` and connect to the first IPv4 candidate that answers
    ///
    /// Fails with `Cancelled` if the socket was shut down beforehand.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.check_shutdown()?;
        if !matches!(self.handle, Handle::Fresh) {
            return Err(self.wrong_state("connect"));
        }

        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| SbdpError::Transport(format!("failed to resolve {}: {}", host, e)))?
            .filter(SocketAddr::is_ipv4)
            .collect();

        let mut last_error = None;
        for addr in candidates {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    tracing::debug!("Connected to {}", addr);
                    stream.set_nodelay(true)?;
                    self.handle = Handle::Connected(stream);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => SbdpError::Transport(format!(
                "could not connect to {}:{}: {}",
                host, port, e
            )),
            None => SbdpError::Transport(format!("no IPv4 address found for {}", host)),
        })
    }

    /// Request cooperative cancellation of every operation on this socket
    ///
    /// The flag stays set; blocked calls are woken by the OS shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);

        let result = match &self.handle {
            Handle::Connected(stream) => stream.shutdown(Shutdown::Both),
            Handle::Listener { listener, .. } => sys::shutdown_listener(listener),
            Handle::Fresh | Handle::Closed => Ok(()),
        };

        match result {
            Ok(()) => tracing::debug!("Socket shut down"),
            // Peer may already be gone; the flag alone is enough then
            Err(e) => tracing::debug!("Socket shutdown: {}", e),
        }
    }

    /// Release the OS handle. Further calls are no-ops.
    pub fn close(&mut self) {
        if !matches!(self.handle, Handle::Closed) {
            tracing::trace!("Closing socket");
            self.handle = Handle::Closed;
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Numeric address of the remote endpoint, or a sentinel string
    pub fn peer_address(&self) -> String {
        match &self.handle {
            Handle::Connected(stream) => stream
                .peer_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|_| PEER_ADDRESS_UNAVAILABLE.to_string()),
            _ => PEER_ADDRESS_UNAVAILABLE.to_string(),
        }
    }

    /// Local address of a bound listener or connected stream
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match &self.handle {
            Handle::Connected(stream) => Ok(stream.local_addr()?),
            Handle::Listener { listener, .. } => Ok(listener.local_addr()?),
            _ => Err(self.wrong_state("query local address of")),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.handle, Handle::Connected(_))
    }

    // =========================================================================
    // Data Transfer
    // =========================================================================

    /// Write the whole buffer, looping over partial writes
    pub fn send_all(&self, buf: &[u8]) -> Result<()> {
        let mut stream = self.stream("send")?;
        let mut sent = 0;

        while sent < buf.len() {
            self.check_shutdown()?;

            match stream.write(&buf[sent..]) {
                Ok(0) => {
                    return Err(SbdpError::Transport(format!(
                        "connection accepted no data after {} of {} bytes",
                        sent,
                        buf.len()
                    )))
                }
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_failure(e)),
            }
        }

        Ok(())
    }

    /// Fill the whole buffer, looping over partial reads
    ///
    /// A zero `timeout` blocks indefinitely. Otherwise each read is
    /// bounded by `timeout`, so a slow but live peer may take longer
    /// than `timeout` overall.
    pub fn recv_all(&self, buf: &mut [u8], timeout: Duration) -> Result<()> {
        let mut stream = self.stream("receive")?;
        stream.set_read_timeout((!timeout.is_zero()).then_some(timeout))?;
        let mut received = 0;

        while received < buf.len() {
            self.check_shutdown()?;

            match stream.read(&mut buf[received..]) {
                Ok(0) => {
                    self.check_shutdown()?;
                    return Err(SbdpError::Closed {
                        received,
                        expected: buf.len(),
                    });
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    self.check_shutdown()?;
                    return Err(SbdpError::Timeout(timeout));
                }
                Err(e) => return Err(self.io_failure(e)),
            }
        }

        Ok(())
    }

    /// Encode and send one message
    pub fn send_message(&self, message: &Message) -> Result<()> {
        framing::send_message(self, message)
    }

    /// Receive and decode one message
    pub fn recv_message(&self, timeout: Duration) -> Result<Message> {
        framing::recv_message(self, timeout)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn stream(&self, op: &str) -> Result<&TcpStream> {
        match &self.handle {
            Handle::Connected(stream) => Ok(stream),
            _ => Err(self.wrong_state(op)),
        }
    }

    fn check_shutdown(&self) -> Result<()> {
        if self.is_shutdown() {
            return Err(SbdpError::Cancelled);
        }
        Ok(())
    }

    /// Map an OS error, preferring Cancelled when a shutdown caused it
    fn io_failure(&self, e: io::Error) -> SbdpError {
        if self.is_shutdown() {
            SbdpError::Cancelled
        } else {
            SbdpError::Io(e)
        }
    }

    fn wrong_state(&self, op: &str) -> SbdpError {
        let state = match &self.handle {
            Handle::Fresh => "not bound or connected",
            Handle::Listener {
                listening: false, ..
            } => "bound but not listening",
            Handle::Listener { .. } => "listening",
            Handle::Connected(_) => "connected",
            Handle::Closed => "closed",
        };
        SbdpError::Transport(format!("cannot {} socket: it is {}", op, state))
    }
}
