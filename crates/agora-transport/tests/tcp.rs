//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on a random port and talk to it with a
//! plain `tokio::net::TcpStream`.

use std::time::Duration;

use agora_transport::{TcpConnection, TcpTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn bound() -> (TcpTransport, String) {
    let transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("local addr").to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_tcp_accept_and_send_receive() {
    let (mut transport, addr) = bound().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let mut client = TcpStream::connect(&addr).await.expect("connect");
    let conn = server_handle.await.expect("task should complete");
    let conn_id = conn.id();
    assert!(conn_id.into_inner() > 0);

    let (mut reader, writer) = conn.into_split(1024);
    assert_eq!(reader.id(), conn_id);

    // Server writes, client reads.
    writer.try_send(b"hello from server\n").expect("try_send");
    let mut buf = [0u8; 64];
    let n = client.read(&mut buf).await.expect("client read");
    assert_eq!(&buf[..n], b"hello from server\n");

    // Client writes, server reads.
    client.write_all(b"hello from client\n").await.unwrap();
    let data = reader.recv().await.expect("recv").expect("data");
    assert_eq!(data, b"hello from client\n");
}

#[tokio::test]
async fn test_recv_returns_none_on_client_close() {
    let (mut transport, addr) = bound().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpStream::connect(&addr).await.expect("connect");
    let conn = server_handle.await.unwrap();
    let (mut reader, _writer) = conn.into_split(1024);

    drop(client);

    let result = tokio::time::timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("recv should not hang")
        .expect("recv should not error");
    assert!(result.is_none(), "should return None on client close");
}

#[tokio::test]
async fn test_recv_is_bounded_by_read_capacity() {
    let (mut transport, addr) = bound().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let mut client = TcpStream::connect(&addr).await.expect("connect");
    let conn = server_handle.await.unwrap();
    let (mut reader, _writer) = conn.into_split(4);

    client.write_all(b"abcdefgh").await.unwrap();
    let first = reader.recv().await.unwrap().unwrap();
    assert!(first.len() <= 4);
}

#[tokio::test]
async fn test_outbound_connect_and_line_reader() {
    let (mut transport, addr) = bound().await;
    let port = transport.local_addr().unwrap().port();

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpConnection::connect("127.0.0.1", port)
        .await
        .expect("connect");
    assert_eq!(client.peer().to_string(), addr);
    let server = server_handle.await.unwrap();

    let (_server_reader, server_writer) = server.into_split(1024);
    let (client_reader, _client_writer) = client.into_split(1024);
    let mut lines = client_reader.into_lines();

    server_writer.try_send(b"OK\nBYE\n").unwrap();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("OK"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("BYE"));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let (transport, _) = bound().await;
    let port = transport.local_addr().unwrap().port();
    drop(transport);

    let err = TcpConnection::connect("127.0.0.1", port)
        .await
        .err()
        .expect("nothing listens there anymore");
    assert!(matches!(err, TransportError::ConnectFailed { .. }));
}

#[tokio::test]
async fn test_try_send_reports_would_block_when_peer_stops_reading() {
    let (mut transport, addr) = bound().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    // Kept open but never read from.
    let _client = TcpStream::connect(&addr).await.expect("connect");
    let conn = server_handle.await.unwrap();
    let (_reader, writer) = conn.into_split(1024);

    let chunk = vec![b'x'; 64 * 1024];
    let mut accepted = 0usize;
    let err = loop {
        match writer.try_send(&chunk) {
            Ok(()) => accepted += chunk.len(),
            Err(e) => break e,
        }
        assert!(
            accepted < 512 * 1024 * 1024,
            "socket buffers never filled up"
        );
    };

    match err {
        TransportError::WouldBlock { written, total } => {
            assert_eq!(total, chunk.len());
            assert!(written < total);
        }
        other => panic!("expected WouldBlock, got {other:?}"),
    }
}
