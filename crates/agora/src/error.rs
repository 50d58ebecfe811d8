//! Unified error type for Agora.

use agora_protocol::ProtocolError;
use agora_session::SessionError;
use agora_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum AgoraError {
    /// A transport-level error (bind, accept, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (undecodable input, malformed command).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (nickname taken, not in a room, ...).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Local I/O outside the relay connection (e.g. the client's stdin).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The server or client was configured with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}
