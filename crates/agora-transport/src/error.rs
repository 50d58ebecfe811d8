/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the connection (or a write made no progress).
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A non-blocking write could not complete without waiting.
    ///
    /// The relay never queues output, so a peer whose socket buffer is
    /// full is treated exactly like a broken one.
    #[error("send would block after {written} of {total} bytes")]
    WouldBlock { written: usize, total: usize },

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Connecting to a remote server failed.
    #[error("connect to {addr} failed: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
