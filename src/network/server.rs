//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of worker
//! threads. `shutdown()` stops the accept loop and cancels every live
//! connection; `run()` then returns once the workers have drained.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use super::{Connection, Socket};
use crate::config::Config;
use crate::error::{Result, SbdpError};
use crate::protocol::Message;

/// Application logic invoked once per received message
pub trait Handler: Send + Sync {
    /// Produce the reply for `request`, or None to send nothing
    fn handle(&self, peer: &str, request: Message) -> Option<Message>;
}

impl<F> Handler for F
where
    F: Fn(&str, Message) -> Option<Message> + Send + Sync,
{
    fn handle(&self, peer: &str, request: Message) -> Option<Message> {
        self(peer, request)
    }
}

/// An accepted connection waiting for a worker
type Job = (u64, Arc<Socket>);

/// TCP server for SBDP
pub struct Server {
    config: Config,

    /// Listening socket
    listener: Socket,

    /// Live connections, so shutdown can cancel them
    connections: Mutex<HashMap<u64, Arc<Socket>>>,

    next_id: AtomicU64,

    shutdown: AtomicBool,
}

impl Server {
    /// Validate the config, then bind and listen
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let mut listener = Socket::create();
        listener.bind(config.port)?;
        listener.listen(config.backlog)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of connections currently registered
    pub fn active_connections(&self) -> usize {
        self.connections.lock().len()
    }

    /// Serve connections until `shutdown()` is called (blocking)
    pub fn run<H: Handler>(&self, handler: H) -> Result<()> {
        let (tx, rx) = channel::bounded::<Job>(self.config.workers);
        let handler = &handler;

        thread::scope(move |scope| -> Result<()> {
            for id in 0..self.config.workers {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("sbdp-worker-{}", id))
                    .spawn_scoped(scope, move || self.worker_loop(rx, handler))?;
            }
            drop(rx);

            let result = self.accept_loop(&tx);
            if result.is_err() {
                // Cancel live connections so the workers can be joined
                self.shutdown();
            }

            // Disconnect the channel so idle workers exit
            drop(tx);
            result
        })
    }

    /// Stop accepting and cancel every live connection
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Server shutting down");

        self.listener.shutdown();
        for socket in self.connections.lock().values() {
            socket.shutdown();
        }
    }

    fn accept_loop(&self, tx: &Sender<Job>) -> Result<()> {
        loop {
            let socket = match self.listener.accept() {
                Ok(socket) => Arc::new(socket),
                Err(SbdpError::Cancelled) => {
                    tracing::debug!("Accept loop stopped");
                    return Ok(());
                }
                Err(SbdpError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::debug!("Peer aborted before accept completed");
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    return Err(e);
                }
            };

            let id = self.register(&socket);
            if tx.send((id, socket)).is_err() {
                // Every worker is gone
                self.connections.lock().remove(&id);
                return Ok(());
            }
        }
    }

    fn register(&self, socket: &Arc<Socket>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(id, Arc::clone(socket));

        // Accepted while shutdown() was walking the registry
        if self.shutdown.load(Ordering::SeqCst) {
            socket.shutdown();
        }
        id
    }

    fn worker_loop<H: Handler>(&self, rx: Receiver<Job>, handler: &H) {
        for (id, socket) in rx.iter() {
            let connection = Connection::new(socket, &self.config);
            if let Err(e) = connection.handle(handler) {
                tracing::warn!("Connection {} ended with error: {}", connection.peer_addr(), e);
            }
            self.connections.lock().remove(&id);
        }
    }
}
