//! Framing Tests
//!
//! One-message-per-call send/receive over loopback connections.

mod common;

use std::thread;
use std::time::Duration;

use common::connected_pair;
use sbdp::network::recv_message_with_limit;
use sbdp::protocol::MAX_KEY_LEN;
use sbdp::{encode, recv_message, send_message, FormatError, Message, SbdpError, Value};

fn sample_message() -> Message {
    Message::new()
        .with("id", 42i64)
        .with("name", "alice")
        .with("ratio", 0.25f64)
        .with("count", 7u64)
        .with("blob", vec![0u8, 1, 2, 255])
}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_send_recv_message() {
    let (client, server) = connected_pair();
    send_message(&client, &sample_message()).unwrap();

    let received = recv_message(&server, Duration::from_secs(5)).unwrap();
    assert_eq!(received, sample_message());
}

#[test]
fn test_socket_convenience_methods() {
    let (client, server) = connected_pair();
    client.send_message(&sample_message()).unwrap();
    assert_eq!(server.recv_message(Duration::ZERO).unwrap(), sample_message());
}

#[test]
fn test_empty_message() {
    let (client, server) = connected_pair();
    send_message(&client, &Message::new()).unwrap();
    assert!(recv_message(&server, Duration::from_secs(5)).unwrap().is_empty());
}

#[test]
fn test_messages_keep_boundaries() {
    let (client, server) = connected_pair();

    for i in 0..20i64 {
        let msg = Message::new().with("seq", i).with("pad", "x".repeat(i as usize));
        send_message(&client, &msg).unwrap();
    }

    for i in 0..20i64 {
        let msg = recv_message(&server, Duration::from_secs(5)).unwrap();
        assert_eq!(msg.get("seq"), Some(&Value::Int64(i)));
        assert_eq!(msg.get("pad").and_then(Value::as_str).map(str::len), Some(i as usize));
    }
}

#[test]
fn test_request_reply_both_directions() {
    let (client, server) = connected_pair();

    thread::scope(|s| {
        s.spawn(|| {
            let request = recv_message(&server, Duration::from_secs(5)).unwrap();
            let n = request.get("n").and_then(Value::as_u64).unwrap();
            send_message(&server, &Message::new().with("n", n + 1)).unwrap();
        });

        send_message(&client, &Message::new().with("n", 41u64)).unwrap();
        let reply = recv_message(&client, Duration::from_secs(5)).unwrap();
        assert_eq!(reply.get("n"), Some(&Value::UInt64(42)));
    });
}

#[test]
fn test_frame_delivered_byte_by_byte() {
    let (client, server) = connected_pair();
    let frame = encode(&sample_message());

    thread::scope(|s| {
        s.spawn(|| {
            for byte in frame.iter() {
                client.send_all(&[*byte]).unwrap();
                thread::sleep(Duration::from_millis(1));
            }
        });

        let received = recv_message(&server, Duration::from_secs(2)).unwrap();
        assert_eq!(received, sample_message());
    });
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_header_timeout() {
    let (_client, server) = connected_pair();
    let err = recv_message(&server, Duration::from_millis(100)).unwrap_err();

    assert!(matches!(err, SbdpError::HeaderReadFailed(_)));
    assert!(err.is_timeout());
}

#[test]
fn test_payload_timeout() {
    let (client, server) = connected_pair();
    // Header promises 100 bytes, only 10 follow
    client.send_all(&100u32.to_be_bytes()).unwrap();
    client.send_all(&[0u8; 10]).unwrap();

    let err = recv_message(&server, Duration::from_millis(150)).unwrap_err();
    assert!(matches!(err, SbdpError::PayloadReadFailed(_)));
    assert!(err.is_timeout());
}

#[test]
fn test_payload_cut_by_peer_close() {
    let (mut client, server) = connected_pair();
    client.send_all(&50u32.to_be_bytes()).unwrap();
    client.send_all(&[0u8; 5]).unwrap();
    client.close();

    let err = recv_message(&server, Duration::ZERO).unwrap_err();
    assert!(matches!(err, SbdpError::PayloadReadFailed(_)));
    assert!(err.is_peer_closed());
}

#[test]
fn test_header_cut_by_peer_close() {
    let (mut client, server) = connected_pair();
    client.close();

    let err = recv_message(&server, Duration::ZERO).unwrap_err();
    assert!(matches!(err, SbdpError::HeaderReadFailed(_)));
    assert!(err.is_peer_closed());
}

#[test]
fn test_codec_error_propagates() {
    let (client, server) = connected_pair();
    client
        .send_all(&[0x00, 0x00, 0x00, 0x04, 0x00, 0x01, b'k', 0x06])
        .unwrap();

    let err = recv_message(&server, Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, SbdpError::Format(FormatError::UnknownType(6))));
}

#[test]
fn test_recv_after_shutdown_cancelled() {
    let (_client, server) = connected_pair();
    server.shutdown();

    let err = recv_message(&server, Duration::from_secs(1)).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_send_rejects_oversized_key() {
    let (client, server) = connected_pair();
    let msg = Message::new().with("k".repeat(MAX_KEY_LEN + 1), 1i64);

    let err = send_message(&client, &msg).unwrap_err();
    assert!(matches!(err, SbdpError::Format(FormatError::KeyTooLong { .. })));

    // Nothing reached the wire
    let err = recv_message(&server, Duration::from_millis(100)).unwrap_err();
    assert!(err.is_timeout());
}

// =============================================================================
// Payload Limit Tests
// =============================================================================

#[test]
fn test_limit_rejects_large_declared_payload() {
    let (client, server) = connected_pair();
    client.send_all(&(64u32 * 1024 * 1024).to_be_bytes()).unwrap();

    let err = recv_message_with_limit(&server, Duration::from_secs(1), 1024).unwrap_err();
    assert!(matches!(
        err,
        SbdpError::PayloadTooLarge {
            declared: 67_108_864,
            max: 1024
        }
    ));
}

#[test]
fn test_limit_allows_payload_at_ceiling() {
    let (client, server) = connected_pair();
    let msg = Message::new().with("b", vec![7u8; 100]);
    let max = (encode(&msg).len() - 4) as u32;
    send_message(&client, &msg).unwrap();

    let received = recv_message_with_limit(&server, Duration::from_secs(1), max).unwrap();
    assert_eq!(received, msg);
}
