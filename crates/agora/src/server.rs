//! `AgoraServer` builder and the event loop.
//!
//! This is the entry point for running the relay. It ties together all the
//! layers: transport → protocol → interpreter → room broadcast.
//!
//! # Execution model
//!
//! One task, the event loop, owns the listener, the session registry and
//! the write half of every connection. Each connection also gets a small
//! read pump task that waits for readability and forwards whatever one read
//! returned as a [`ConnectionEvent`]. Pumps hold no shared state, so all
//! mutation and every write happens in the loop and nothing is locked.
//!
//! ```text
//!   listener ──accept──┐
//!                      ├──→ event loop ──→ codec → interpreter → outbox ──→ try_send
//!   pump(conn-N) ──────┘        │
//!                               └──→ teardown: abort pump, drop session, drop writer
//! ```
//!
//! The `agora-server` binary runs this on a current-thread runtime, so the
//! loop and every pump share a single OS thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;

use agora_protocol::{Codec, LineCodec};
use agora_room::{Delivery, Outbox};
use agora_session::{Session, SessionRegistry};
use agora_transport::{
    ConnectionId, ConnectionReader, ConnectionWriter, TcpConnection,
    TcpTransport, Transport, TransportError, DEFAULT_READ_BUFFER,
};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::interpreter::{interpret, Flow};
use crate::AgoraError;

/// Capacity of the channel carrying pump events into the event loop.
///
/// When it is full, pumps stop reading and the kernel buffers the rest.
const EVENT_CAPACITY: usize = 256;

/// What a read pump observed on its connection.
#[derive(Debug)]
enum ConnectionEvent {
    /// One read's worth of bytes.
    Readable { id: ConnectionId, data: Vec<u8> },
    /// The peer closed its side (zero-length read).
    Closed { id: ConnectionId },
    /// Reading failed.
    Failed {
        id: ConnectionId,
        error: TransportError,
    },
}

/// Why the event loop woke up.
enum Wake {
    Accepted(Result<TcpConnection, TransportError>),
    Event(ConnectionEvent),
}

/// Loop-side state of one open connection.
struct Link {
    writer: ConnectionWriter,
    pump: AbortHandle,
}

/// Builder for configuring and starting an Agora server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn start() -> Result<(), agora::AgoraError> {
/// use agora::AgoraServer;
///
/// let server = AgoraServer::builder()
///     .bind("0.0.0.0:4000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct AgoraServerBuilder {
    bind_addr: String,
    read_buffer: usize,
}

impl AgoraServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the size of the per-read buffer (default 16 KiB).
    pub fn read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer = bytes;
        self
    }

    /// Binds the listener. Nothing is accepted until [`AgoraServer::run`].
    ///
    /// # Errors
    /// - [`AgoraError::Config`] — the read buffer size is zero
    /// - [`AgoraError::Transport`] — the address could not be bound
    pub async fn build(self) -> Result<AgoraServer, AgoraError> {
        if self.read_buffer == 0 {
            return Err(AgoraError::Config(
                "read buffer must not be empty".into(),
            ));
        }

        let transport = TcpTransport::bind(&self.bind_addr).await?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);

        Ok(AgoraServer {
            transport,
            codec: LineCodec,
            sessions: SessionRegistry::new(),
            links: HashMap::new(),
            events_tx,
            events_rx,
            read_buffer: self.read_buffer,
        })
    }
}

impl Default for AgoraServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Agora relay.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct AgoraServer<C: Codec = LineCodec> {
    transport: TcpTransport,
    codec: C,
    sessions: SessionRegistry,
    links: HashMap<ConnectionId, Link>,
    /// Cloned into every pump. Keeping one here means `recv` never sees a
    /// closed channel.
    events_tx: mpsc::Sender<ConnectionEvent>,
    events_rx: mpsc::Receiver<ConnectionEvent>,
    read_buffer: usize,
}

impl AgoraServer {
    /// Creates a new builder.
    pub fn builder() -> AgoraServerBuilder {
        AgoraServerBuilder::new()
    }
}

impl<C: Codec> AgoraServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the event loop until the process is terminated or the listener
    /// fails.
    ///
    /// Waits until either the listener has a pending connection or some
    /// pump has an event, services that one thing, and waits again.
    ///
    /// # Errors
    /// Returns [`AgoraError::Transport`] when the listener itself fails
    /// (e.g. out of file descriptors). A connection that was reset before
    /// it could be accepted is skipped.
    pub async fn run(mut self) -> Result<(), AgoraError> {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            "Agora relay running"
        );

        loop {
            // Both futures are cancel safe: losing the race drops them
            // without consuming a connection or an event.
            let wake = tokio::select! {
                accepted = self.transport.accept() => Wake::Accepted(accepted),
                Some(event) = self.events_rx.recv() => Wake::Event(event),
            };

            match wake {
                Wake::Accepted(Ok(conn)) => self.open(conn),
                Wake::Accepted(Err(e)) if accept_is_transient(&e) => {
                    tracing::debug!(error = %e, "pending connection dropped before accept");
                }
                Wake::Accepted(Err(e)) => {
                    tracing::error!(error = %e, "accept failed, stopping relay");
                    return Err(e.into());
                }
                Wake::Event(event) => self.service(event),
            }
        }
    }

    /// Registers a new connection: fresh session, read pump, write half.
    fn open(&mut self, conn: TcpConnection) {
        let id = conn.id();
        let peer = conn.peer();

        if let Err(e) = self.sessions.insert(id) {
            tracing::error!(conn_id = %id, error = %e, "duplicate connection id");
            return;
        }

        let (reader, writer) = conn.into_split(self.read_buffer);
        let pump = tokio::spawn(pump(reader, self.events_tx.clone()));
        self.links.insert(
            id,
            Link {
                writer,
                pump: pump.abort_handle(),
            },
        );

        tracing::info!(conn_id = %id, %peer, live = self.links.len(), "connection opened");
    }

    fn service(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Readable { id, data } => self.on_readable(id, &data),
            ConnectionEvent::Closed { id } => {
                tracing::debug!(conn_id = %id, "peer closed the connection");
                self.close(id);
            }
            ConnectionEvent::Failed { id, error } => {
                tracing::debug!(conn_id = %id, %error, "read failed");
                self.close(id);
            }
        }
    }

    fn on_readable(&mut self, id: ConnectionId, data: &[u8]) {
        // Events a pump queued before its connection was torn down.
        if !self.links.contains_key(&id) {
            return;
        }

        let line = match self.codec.decode(data) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(conn_id = %id, error = %e, "undecodable input");
                self.close(id);
                return;
            }
        };

        let mut outbox = Outbox::new();
        let flow = interpret(&mut self.sessions, id, &line, &mut outbox);
        self.deliver(outbox);

        if flow == Flow::Close {
            self.close(id);
        }
    }

    /// Writes every queued line, in order, tearing down any recipient
    /// whose write fails.
    fn deliver(&mut self, outbox: Outbox) {
        let mut dead = Vec::new();

        for Delivery { to, line } in outbox {
            if dead.contains(&to) {
                continue;
            }
            let Some(link) = self.links.get(&to) else {
                continue;
            };
            if let Err(error) = link.writer.try_send(&self.codec.encode(&line)) {
                tracing::warn!(conn_id = %to, %error, "write failed, dropping connection");
                dead.push(to);
            }
        }

        for id in dead {
            self.close(id);
        }
    }

    /// Tears a connection down. Idempotent.
    ///
    /// No room hears about it: only `/leave` and `/bye` announce departures.
    fn close(&mut self, id: ConnectionId) {
        let Some(link) = self.links.remove(&id) else {
            return;
        };
        link.pump.abort();
        let session = self.sessions.remove(id);

        tracing::info!(
            conn_id = %id,
            peer = %link.writer.peer(),
            nickname = ?session.as_ref().and_then(Session::nickname),
            live = self.links.len(),
            "connection closed"
        );
        // Dropping `link.writer` here closes our side of the socket.
    }
}

/// Accept errors that concern one pending connection, not the listener.
fn accept_is_transient(error: &TransportError) -> bool {
    match error {
        TransportError::AcceptFailed(e) => matches!(
            e.kind(),
            ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset
                | ErrorKind::Interrupted
        ),
        _ => false,
    }
}

/// Forwards one connection's reads to the event loop until end of stream
/// or error.
async fn pump(
    mut reader: ConnectionReader,
    events: mpsc::Sender<ConnectionEvent>,
) {
    let id = reader.id();
    loop {
        let event = match reader.recv().await {
            Ok(Some(data)) => ConnectionEvent::Readable { id, data },
            Ok(None) => ConnectionEvent::Closed { id },
            Err(error) => ConnectionEvent::Failed { id, error },
        };
        let last = !matches!(event, ConnectionEvent::Readable { .. });
        if events.send(event).await.is_err() || last {
            break;
        }
    }
}
