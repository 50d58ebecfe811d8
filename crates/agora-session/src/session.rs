//! Session types: the data structures that represent one chat connection.
//!
//! A "session" is the server's record of an open connection. It tracks:
//! - WHICH connection it belongs to (`ConnectionId`)
//! - WHO the user is (their nickname, once chosen)
//! - WHERE they are (their room, once joined)

use std::fmt;

use agora_transport::ConnectionId;

use crate::SessionError;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The coarse lifecycle position of a session, without its data.
///
/// Ordered, so `phase >= Phase::Named` reads as "has a nickname".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Just connected; no nickname yet.
    Fresh,
    /// Has a nickname, not in a room.
    Named,
    /// Has a nickname and is in a room.
    InRoom,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fresh => "fresh",
            Self::Named => "named",
            Self::InRoom => "in-room",
        })
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The state machine of a session, carrying the data each state owns.
///
/// ```text
///            rename              enter
///   Fresh ──────────→ Named ──────────→ InRoom ──┐
///                       ↑                  │     │ enter (switch room)
///                       └────── leave ─────┘ ←───┘
/// ```
///
/// A room can only exist next to a nickname, so "in a room without a
/// nickname" has no representation at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, nothing chosen yet.
    Fresh,
    /// Nickname chosen.
    Named { nickname: String },
    /// Nickname chosen and inside `room`.
    InRoom { nickname: String, room: String },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single connection's session on the server.
///
/// Created when the connection is accepted, removed when it is torn down.
#[derive(Debug, Clone)]
pub struct Session {
    id: ConnectionId,
    state: SessionState,
}

impl Session {
    /// Creates a fresh session for a newly accepted connection.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::Fresh,
        }
    }

    /// The connection this session belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The full state, for callers that want to match on it.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::Fresh => Phase::Fresh,
            SessionState::Named { .. } => Phase::Named,
            SessionState::InRoom { .. } => Phase::InRoom,
        }
    }

    /// The nickname, if one has been chosen.
    pub fn nickname(&self) -> Option<&str> {
        match &self.state {
            SessionState::Fresh => None,
            SessionState::Named { nickname }
            | SessionState::InRoom { nickname, .. } => Some(nickname.as_str()),
        }
    }

    /// The room, if the session is in one.
    pub fn room(&self) -> Option<&str> {
        match &self.state {
            SessionState::InRoom { room, .. } => Some(room.as_str()),
            _ => None,
        }
    }

    /// Sets the nickname and returns the previous one.
    ///
    /// A fresh session becomes `Named`; otherwise the phase (and room) are
    /// kept. Uniqueness is the registry's job, not this method's.
    pub fn rename(&mut self, nickname: String) -> Option<String> {
        match self.state {
            SessionState::Fresh => {
                self.state = SessionState::Named { nickname };
                None
            }
            SessionState::Named {
                nickname: ref mut current,
            }
            | SessionState::InRoom {
                nickname: ref mut current,
                ..
            } => Some(std::mem::replace(current, nickname)),
        }
    }

    /// Moves the session into `room` and returns the room it was in before.
    ///
    /// # Errors
    /// Returns [`SessionError::NoNickname`] for a fresh session; the
    /// session is left untouched.
    pub fn enter(
        &mut self,
        room: String,
    ) -> Result<Option<String>, SessionError> {
        let (nickname, previous) =
            match std::mem::replace(&mut self.state, SessionState::Fresh) {
                SessionState::Fresh => {
                    return Err(SessionError::NoNickname(self.id));
                }
                SessionState::Named { nickname } => (nickname, None),
                SessionState::InRoom {
                    nickname,
                    room: previous,
                } => (nickname, Some(previous)),
            };
        self.state = SessionState::InRoom { nickname, room };
        Ok(previous)
    }

    /// Takes the session out of its room and returns the room's name.
    ///
    /// # Errors
    /// Returns [`SessionError::NotInRoom`] unless the session is `InRoom`;
    /// the session is left untouched.
    pub fn leave(&mut self) -> Result<String, SessionError> {
        match std::mem::replace(&mut self.state, SessionState::Fresh) {
            SessionState::InRoom { nickname, room } => {
                self.state = SessionState::Named { nickname };
                Ok(room)
            }
            other => {
                self.state = other;
                Err(SessionError::NotInRoom(self.id))
            }
        }
    }
}
