//! Integration tests for `ChatClient` against a running relay.

use std::time::Duration;

use agora::{AgoraServer, ChatClient};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

async fn start_server() -> u16 {
    let server = AgoraServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");
    let port = server.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    port
}

/// A client whose callback forwards every line into a channel.
struct Watcher {
    client: ChatClient,
    inbox: mpsc::UnboundedReceiver<String>,
    receiver: JoinHandle<()>,
}

impl Watcher {
    async fn connect(port: u16) -> Self {
        let mut client = ChatClient::connect("127.0.0.1", port)
            .await
            .expect("should connect");
        let (tx, inbox) = mpsc::unbounded_channel();
        let receiver = client
            .on_line(move |line| {
                let _ = tx.send(line);
            })
            .expect("first on_line starts the loop");
        Self {
            client,
            inbox,
            receiver,
        }
    }

    async fn next(&mut self) -> String {
        timeout(Duration::from_secs(2), self.inbox.recv())
            .await
            .expect("timed out waiting for a line")
            .expect("receive loop ended")
    }

    async fn ask(&mut self, line: &str) -> String {
        self.client.submit(line).await.expect("submit");
        self.next().await
    }
}

#[tokio::test]
async fn test_client_commands_and_callback() {
    let port = start_server().await;
    let mut ana = Watcher::connect(port).await;
    let mut bia = Watcher::connect(port).await;

    assert_eq!(ana.ask("/nick ana").await, "OK");
    assert_eq!(bia.ask("/nick bia").await, "OK");
    assert_eq!(ana.ask("/join sala").await, "OK");
    assert_eq!(bia.ask("/join sala").await, "OK");
    assert_eq!(ana.next().await, "JOINED bia");

    ana.client.submit("bom dia").await.unwrap();
    assert_eq!(bia.next().await, "ana: bom dia");
}

#[tokio::test]
async fn test_client_escapes_slash_lines_that_are_not_commands() {
    let port = start_server().await;
    let mut ana = Watcher::connect(port).await;
    let mut bia = Watcher::connect(port).await;
    assert_eq!(ana.ask("/nick ana").await, "OK");
    assert_eq!(bia.ask("/nick bia").await, "OK");
    assert_eq!(ana.ask("/join x").await, "OK");
    assert_eq!(bia.ask("/join x").await, "OK");
    assert_eq!(ana.next().await, "JOINED bia");

    // Typed with a single slash, relayed with it intact.
    ana.client.submit("/shrug").await.unwrap();
    assert_eq!(bia.next().await, "ana: /shrug");
}

#[tokio::test]
async fn test_on_line_only_starts_once() {
    let port = start_server().await;
    let mut watcher = Watcher::connect(port).await;
    assert!(watcher.client.on_line(|_| {}).is_none());
}

#[tokio::test]
async fn test_empty_input_is_not_sent() {
    let port = start_server().await;
    let mut watcher = Watcher::connect(port).await;
    watcher.client.submit("").await.unwrap();
    // The first reply belongs to the nick command, not to an empty chat line.
    assert_eq!(watcher.ask("/nick ana").await, "OK");
}

#[tokio::test]
async fn test_receive_loop_ends_after_bye() {
    let port = start_server().await;
    let mut watcher = Watcher::connect(port).await;
    assert_eq!(watcher.ask("/bye").await, "BYE");

    timeout(Duration::from_secs(2), &mut watcher.receiver)
        .await
        .expect("receive loop should end when the server closes")
        .expect("receive task should not panic");
}

#[tokio::test]
async fn test_connect_refused() {
    let server = AgoraServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .unwrap();
    let port = server.local_addr().unwrap().port();
    drop(server);

    assert!(ChatClient::connect("127.0.0.1", port).await.is_err());
}
