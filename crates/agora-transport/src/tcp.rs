//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::{ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Size of the buffer a single read lands in (16 KiB).
pub const DEFAULT_READ_BUFFER: usize = 16 * 1024;

fn next_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        // `TcpListener::accept` is cancel safe and tokio sockets are
        // always non-blocking, so nothing else to configure here.
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = next_id();
        tracing::debug!(%id, %peer, "accepted TCP connection");

        Ok(TcpConnection { id, peer, stream })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A single TCP connection, before it is split into halves.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
}

impl TcpConnection {
    /// Opens an outbound connection to `host:port`.
    pub async fn connect(
        host: &str,
        port: u16,
    ) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect(&addr).await.map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            }
        })?;
        let peer = stream.peer_addr().map_err(|source| {
            TransportError::ConnectFailed { addr, source }
        })?;
        Ok(Self {
            id: next_id(),
            peer,
            stream,
        })
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Splits the connection into independently owned read and write halves.
    ///
    /// `read_capacity` bounds how many bytes a single [`ConnectionReader::recv`]
    /// can return.
    pub fn into_split(
        self,
        read_capacity: usize,
    ) -> (ConnectionReader, ConnectionWriter) {
        let (read, write) = self.stream.into_split();
        let reader = ConnectionReader {
            id: self.id,
            half: read,
            buf: vec![0; read_capacity.max(1)],
        };
        let writer = ConnectionWriter {
            peer: self.peer,
            half: write,
        };
        (reader, writer)
    }
}

/// The read half of a [`TcpConnection`].
pub struct ConnectionReader {
    id: ConnectionId,
    half: OwnedReadHalf,
    buf: Vec<u8>,
}

impl ConnectionReader {
    /// Returns the identifier of the connection this half belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Waits until the socket is readable and returns whatever one read
    /// produced.
    ///
    /// Returns `Ok(None)` at end of stream (a zero-length read).
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let n = self
            .half
            .read(&mut self.buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[..n].to_vec()))
    }

    /// Turns this half into a newline-framed line reader.
    ///
    /// Used by clients, which read the server's output line by line.
    pub fn into_lines(self) -> Lines<BufReader<OwnedReadHalf>> {
        BufReader::new(self.half).lines()
    }
}

/// The write half of a [`TcpConnection`].
///
/// Dropping it shuts down the write direction of the socket.
pub struct ConnectionWriter {
    peer: SocketAddr,
    half: OwnedWriteHalf,
}

impl ConnectionWriter {
    /// Returns the remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Writes all of `data` without waiting.
    ///
    /// Fails with [`TransportError::WouldBlock`] if the socket buffer
    /// cannot take the whole message right now.
    pub fn try_send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut written = 0;
        while written < data.len() {
            match self.half.try_write(&data[written..]) {
                Ok(0) => {
                    return Err(TransportError::ConnectionClosed(
                        "write returned zero bytes".into(),
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    return Err(TransportError::WouldBlock {
                        written,
                        total: data.len(),
                    });
                }
                Err(e) => return Err(TransportError::SendFailed(e)),
            }
        }
        Ok(())
    }

    /// Writes all of `data`, waiting for socket capacity as needed.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.half
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Shuts down the write direction, flushing what was already written.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.half
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }
}
