//! Error types for the protocol layer.
//!
//! The two variants live on opposite sides of an important line:
//! a [`ProtocolError::Decode`] kills the connection it came from, while a
//! [`ProtocolError::InvalidCommand`] only earns the client an `ERROR` reply.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes of a read were not valid UTF-8.
    #[error("decode failed: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// A recognised command was used with missing or empty arguments.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
