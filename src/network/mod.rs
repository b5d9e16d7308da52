//! Network Module
//!
//! TCP transport, message framing, and the dictionary server.
//!
//! ## Architecture
//! - `Socket`: blocking, single-owner endpoint with cooperative shutdown
//! - `framing`: one message per `send_message` / `recv_message` call
//! - `Server`: single acceptor thread, worker thread pool for connections

mod sys;
mod socket;
mod framing;
mod server;
mod connection;

pub use socket::{Socket, PEER_ADDRESS_UNAVAILABLE};
pub use framing::{recv_message, recv_message_with_limit, send_message};
pub use server::{Handler, Server};
pub use connection::Connection;
