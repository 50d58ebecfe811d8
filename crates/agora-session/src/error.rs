//! Error types for the session layer.

use agora_transport::ConnectionId;

/// Errors that can occur during session management.
///
/// Every one of these is a protocol-level refusal: the interpreter turns
/// them into an `ERROR` reply and the connection stays open.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given connection.
    #[error("session not found for {0}")]
    NotFound(ConnectionId),

    /// A session was already registered for this connection.
    #[error("{0} already has a session")]
    AlreadyRegistered(ConnectionId),

    /// The nickname belongs to another live session.
    #[error("nickname {0:?} is already taken")]
    NicknameTaken(String),

    /// No live session holds this nickname.
    #[error("no session with nickname {0:?}")]
    UnknownNickname(String),

    /// The operation needs a nickname and the session has none yet.
    #[error("{0} has no nickname")]
    NoNickname(ConnectionId),

    /// The operation needs the session to be in a room.
    #[error("{0} is not in a room")]
    NotInRoom(ConnectionId),
}
