//! Client side of the line protocol.
//!
//! A [`ChatClient`] is everything a front end needs: connect, submit the
//! lines the user types, and get a callback for every line the server
//! sends. Display is the front end's business.

use agora_protocol::escape_outgoing;
use agora_transport::{
    ConnectionReader, ConnectionWriter, TcpConnection, DEFAULT_READ_BUFFER,
};
use tokio::task::JoinHandle;

use crate::AgoraError;

/// A connection to an Agora relay.
pub struct ChatClient {
    writer: ConnectionWriter,
    reader: Option<ConnectionReader>,
}

impl ChatClient {
    /// Connects to the relay at `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self, AgoraError> {
        let conn = TcpConnection::connect(host, port).await?;
        tracing::debug!(peer = %conn.peer(), "connected to relay");
        let (reader, writer) = conn.into_split(DEFAULT_READ_BUFFER);
        Ok(Self {
            writer,
            reader: Some(reader),
        })
    }

    /// Sends one line as the user typed it.
    ///
    /// Applies [`escape_outgoing`] and appends the newline. Empty input is
    /// not sent.
    pub async fn submit(&mut self, line: &str) -> Result<(), AgoraError> {
        if line.is_empty() {
            return Ok(());
        }
        let mut wire = escape_outgoing(line).into_owned();
        wire.push('\n');
        self.writer.send(wire.as_bytes()).await?;
        Ok(())
    }

    /// Starts the receive loop, calling `callback` once per server line.
    ///
    /// The returned task finishes when the server closes the connection.
    /// Only the first call starts a loop; later calls return `None`.
    pub fn on_line<F>(&mut self, mut callback: F) -> Option<JoinHandle<()>>
    where
        F: FnMut(String) + Send + 'static,
    {
        let reader = self.reader.take()?;
        Some(tokio::spawn(async move {
            let mut lines = reader.into_lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => callback(line),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "connection to relay lost");
                        break;
                    }
                }
            }
        }))
    }

    /// Closes the sending side. The server sees end of stream.
    pub async fn close(&mut self) -> Result<(), AgoraError> {
        self.writer.close().await?;
        Ok(())
    }
}
