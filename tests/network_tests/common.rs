//! Shared loopback helpers for network tests

#![allow(dead_code)]

use sbdp::Socket;

/// A listening socket on an ephemeral loopback-reachable port
pub fn listening_socket() -> (Socket, u16) {
    let mut listener = Socket::create();
    listener.bind(0).unwrap();
    listener.listen(16).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A connected (client, server-side) pair over loopback
pub fn connected_pair() -> (Socket, Socket) {
    let (listener, port) = listening_socket();
    let mut client = Socket::create();
    client.connect("127.0.0.1", port).unwrap();
    let server = listener.accept().unwrap();
    (client, server)
}

/// Connect a fresh client to `port` on loopback
pub fn connect(port: u16) -> Socket {
    let mut client = Socket::create();
    client.connect("127.0.0.1", port).unwrap();
    client
}
