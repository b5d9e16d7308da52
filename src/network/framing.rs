//! Message Framing
//!
//! One complete message per call on top of `Socket::send_all` and
//! `Socket::recv_all`. The 4-byte header is read first, then exactly the
//! declared payload, then the whole frame is handed to the codec.

use std::time::Duration;

use super::Socket;
use crate::error::{Result, SbdpError};
use crate::protocol::{decode, encode_checked, endian, Message, HEADER_SIZE};

/// Encode `message` and write the whole frame
pub fn send_message(socket: &Socket, message: &Message) -> Result<()> {
    let frame = encode_checked(message)?;
    tracing::trace!(
        "Sending message to {}: {} entries, {} bytes",
        socket.peer_address(),
        message.len(),
        frame.len()
    );
    socket.send_all(&frame)
}

/// Receive and decode one message
///
/// The peer-declared payload length is not bounded here; callers that
/// face untrusted peers should use `recv_message_with_limit`.
pub fn recv_message(socket: &Socket, timeout: Duration) -> Result<Message> {
    recv_frame(socket, timeout, None)
}

/// Receive one message, rejecting declared payloads above `max_payload`
/// before any buffer is allocated for them
pub fn recv_message_with_limit(
    socket: &Socket,
    timeout: Duration,
    max_payload: u32,
) -> Result<Message> {
    recv_frame(socket, timeout, Some(max_payload))
}

fn recv_frame(socket: &Socket, timeout: Duration, max_payload: Option<u32>) -> Result<Message> {
    let mut header = [0u8; HEADER_SIZE];
    socket
        .recv_all(&mut header, timeout)
        .map_err(|e| SbdpError::HeaderReadFailed(Box::new(e)))?;

    let payload_len = endian::u32_from_wire(header);
    if let Some(max) = max_payload {
        if payload_len > max {
            return Err(SbdpError::PayloadTooLarge {
                declared: payload_len,
                max,
            });
        }
    }

    let mut frame = vec![0u8; HEADER_SIZE + payload_len as usize];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    socket
        .recv_all(&mut frame[HEADER_SIZE..], timeout)
        .map_err(|e| SbdpError::PayloadReadFailed(Box::new(e)))?;

    let message = decode(&frame)?;
    tracing::trace!(
        "Received message from {}: {} entries, {} bytes",
        socket.peer_address(),
        message.len(),
        frame.len()
    );
    Ok(message)
}
