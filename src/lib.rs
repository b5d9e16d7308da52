//! # SBDP
//!
//! Simple Binary Dictionary Protocol: a compact, self-describing message
//! format for exchanging ordered key → typed-value records, with:
//! - A strict wire codec (length-prefixed, big-endian TLV entries)
//! - Blocking TCP transport with all-or-nothing send/receive
//! - Per-chunk receive timeouts and cooperative shutdown
//! - One-message-per-call framing on top of the transport
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Application / Server                         │
//! │              (Handler per connection)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Message Framing                            │
//! │          (send_message / recv_message)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │   Socket    │
//!   │(encode/dec) │          │ (send/recv) │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Endian    │
//!   │ (host/wire) │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FormatError, Field, SbdpError, Result};
pub use config::Config;
pub use protocol::{decode, encode, encode_checked, Message, Value, ValueType};
pub use network::{recv_message, send_message, Socket};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SBDP
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
