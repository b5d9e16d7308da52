//! Server Tests
//!
//! Echo and request/response behaviour of the threaded server, plus
//! shutdown of the accept loop and live connections.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::connect;
use sbdp::network::Server;
use sbdp::{recv_message, send_message, Config, Message, SbdpError, Value};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn test_config() -> Config {
    Config::builder().port(0).workers(2).backlog(16).build()
}

fn echo(_peer: &str, request: Message) -> Option<Message> {
    Some(request)
}

fn port_of(server: &Server) -> u16 {
    server.local_addr().unwrap().port()
}

// =============================================================================
// Serving Tests
// =============================================================================

#[test]
fn test_echo_roundtrip() {
    let server = Server::bind(test_config()).unwrap();
    let port = port_of(&server);

    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        let client = connect(port);
        let msg = Message::new().with("id", 42i64).with("name", "alice");
        send_message(&client, &msg).unwrap();
        assert_eq!(recv_message(&client, REPLY_TIMEOUT).unwrap(), msg);

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

#[test]
fn test_handler_sees_peer_and_can_stay_silent() {
    let server = Server::bind(test_config()).unwrap();
    let port = port_of(&server);

    let handler = |peer: &str, request: Message| {
        request
            .contains_key("reply")
            .then(|| Message::new().with("peer", peer))
    };

    thread::scope(|s| {
        let running = s.spawn(|| server.run(handler));

        let client = connect(port);
        send_message(&client, &Message::new().with("quiet", 1i64)).unwrap();
        send_message(&client, &Message::new().with("reply", 1i64)).unwrap();

        // Only the second message produces a reply
        let reply = recv_message(&client, REPLY_TIMEOUT).unwrap();
        assert_eq!(reply.get("peer"), Some(&Value::from("127.0.0.1")));

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

#[test]
fn test_concurrent_clients() {
    let server = Server::bind(test_config()).unwrap();
    let port = port_of(&server);

    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        let clients: Vec<_> = (0..4u64)
            .map(|c| {
                s.spawn(move || {
                    let client = connect(port);
                    for i in 0..10u64 {
                        let msg = Message::new().with("client", c).with("seq", i);
                        send_message(&client, &msg).unwrap();
                        assert_eq!(recv_message(&client, REPLY_TIMEOUT).unwrap(), msg);
                    }
                })
            })
            .collect();

        for client in clients {
            client.join().unwrap();
        }

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

#[test]
fn test_malformed_frame_keeps_connection() {
    let server = Server::bind(test_config()).unwrap();
    let port = port_of(&server);

    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        let client = connect(port);
        // Unknown type code 0x06, but a well-formed frame boundary
        client
            .send_all(&[0x00, 0x00, 0x00, 0x04, 0x00, 0x01, b'k', 0x06])
            .unwrap();

        let msg = Message::new().with("ok", 1u64);
        send_message(&client, &msg).unwrap();
        assert_eq!(recv_message(&client, REPLY_TIMEOUT).unwrap(), msg);

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

#[test]
fn test_payload_ceiling_drops_connection() {
    let config = Config::builder()
        .port(0)
        .workers(1)
        .max_payload_len(Some(64))
        .build();
    let server = Server::bind(config).unwrap();
    let port = port_of(&server);

    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        let client = connect(port);
        send_message(&client, &Message::new().with("big", vec![0u8; 1024])).unwrap();

        let err = recv_message(&client, REPLY_TIMEOUT).unwrap_err();
        assert!(err.is_peer_closed(), "got {:?}", err);

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_cancels_idle_connections() {
    let server = Server::bind(test_config()).unwrap();
    let port = port_of(&server);

    let start = Instant::now();
    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        // Idle clients parked in blocking receives on the server side
        let client_a = connect(port);
        let client_b = connect(port);
        send_message(&client_a, &Message::new()).unwrap();
        recv_message(&client_a, REPLY_TIMEOUT).unwrap();
        send_message(&client_b, &Message::new()).unwrap();
        recv_message(&client_b, REPLY_TIMEOUT).unwrap();
        assert_eq!(server.active_connections(), 2);

        server.shutdown();
        running.join().unwrap().unwrap();

        let err = recv_message(&client_a, REPLY_TIMEOUT).unwrap_err();
        assert!(err.is_peer_closed(), "got {:?}", err);
    });

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(server.active_connections(), 0);
}

#[test]
fn test_shutdown_before_run() {
    let server = Server::bind(test_config()).unwrap();
    server.shutdown();
    server.run(echo).unwrap();
}

#[test]
fn test_idle_timeout_closes_connection() {
    let config = Config::builder()
        .port(0)
        .workers(1)
        .recv_timeout_ms(100)
        .build();
    let server = Server::bind(config).unwrap();
    let port = port_of(&server);

    thread::scope(|s| {
        let running = s.spawn(|| server.run(echo));

        let client = connect(port);
        let err = recv_message(&client, REPLY_TIMEOUT).unwrap_err();
        assert!(err.is_peer_closed(), "got {:?}", err);

        server.shutdown();
        running.join().unwrap().unwrap();
    });
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_zero_workers_rejected() {
    let config = Config::builder().port(0).workers(0).build();
    assert!(matches!(Server::bind(config), Err(SbdpError::Config(_))));
}

#[test]
fn test_non_positive_backlog_rejected() {
    let config = Config::builder().port(0).backlog(0).build();
    assert!(matches!(Server::bind(config), Err(SbdpError::Config(_))));
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.port, 9000);
    assert_eq!(config.workers, 4);
    assert_eq!(config.recv_timeout(), Duration::ZERO);
    assert!(config.max_payload_len.is_none());
}
