//! The session registry: every live session, keyed by connection.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it is a plain
//! `HashMap`. It is owned by the event loop and only ever touched from that
//! one task, so there is nothing to lock.
//!
//! # Nickname lookup
//!
//! Lookups by nickname scan every session. At tens to hundreds of
//! connections that is cheaper than keeping a second index in sync.

use std::collections::HashMap;

use agora_transport::ConnectionId;

use crate::{Session, SessionError};

/// All live sessions.
///
/// A session is in here exactly as long as its connection is open: the
/// event loop inserts on accept and removes on teardown.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh session for a newly accepted connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyRegistered`] if `id` already has one.
    pub fn insert(
        &mut self,
        id: ConnectionId,
    ) -> Result<&mut Session, SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }
        tracing::debug!(conn_id = %id, "session created");
        Ok(self.sessions.entry(id).or_insert_with(|| Session::new(id)))
    }

    /// Removes a connection's session, returning it.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        let removed = self.sessions.remove(&id);
        if removed.is_some() {
            tracing::debug!(conn_id = %id, "session removed");
        }
        removed
    }

    /// Looks up a session by connection.
    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Looks up a session by connection, mutably.
    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Finds the session holding `nickname` (exact match).
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&Session> {
        self.sessions
            .values()
            .find(|session| session.nickname() == Some(nickname))
    }

    /// Gives `id` the nickname `nickname`, returning its previous one.
    ///
    /// Holding the same nickname already is not a collision.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — `id` has no session
    /// - [`SessionError::NicknameTaken`] — another session holds it
    pub fn assign_nickname(
        &mut self,
        id: ConnectionId,
        nickname: &str,
    ) -> Result<Option<String>, SessionError> {
        if let Some(holder) = self.find_by_nickname(nickname) {
            if holder.id() != id {
                return Err(SessionError::NicknameTaken(nickname.to_string()));
            }
        }
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        Ok(session.rename(nickname.to_string()))
    }

    /// Iterates over the sessions currently in `room`.
    pub fn in_room<'a>(
        &'a self,
        room: &'a str,
    ) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions
            .values()
            .filter(move |session| session.room() == Some(room))
    }

    /// Iterates over every live session, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
