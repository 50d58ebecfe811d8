//! Command interpreter: one decoded line in, replies and broadcasts out.
//!
//! The interpreter never touches a socket. It mutates the session registry
//! and queues lines in an [`Outbox`]; the event loop writes them afterwards
//! in queue order. That keeps every command testable without a network.
//!
//! Every refusal is the single line `ERROR` to the sender, queued before
//! anything else, so a rejected command has no other visible effect.

use agora_protocol::{Command, ServerLine};
use agora_room::{broadcast, Outbox};
use agora_session::{SessionError, SessionRegistry, SessionState};
use agora_transport::ConnectionId;

/// What the event loop should do with the connection after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the connection open.
    Continue,
    /// Tear the connection down once the outbox is written.
    Close,
}

/// Executes one decoded line sent by `conn`.
pub fn interpret(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    line: &str,
    outbox: &mut Outbox,
) -> Flow {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(conn_id = %conn, error = %e, "malformed command");
            outbox.send(conn, ServerLine::Error);
            return Flow::Continue;
        }
    };

    let name = command.name();
    tracing::debug!(conn_id = %conn, command = name, "dispatching");

    let result = match command {
        Command::Nick(nickname) => nick(sessions, conn, nickname, outbox),
        Command::Join(room) => join(sessions, conn, room, outbox),
        Command::Leave => leave(sessions, conn, outbox),
        Command::Bye => bye(sessions, conn, outbox),
        Command::Priv { to, text } => private(sessions, conn, to, text, outbox),
        Command::Say(text) => say(sessions, conn, text, outbox),
    };

    match result {
        Ok(flow) => flow,
        Err(e) => {
            tracing::debug!(conn_id = %conn, command = name, error = %e, "command refused");
            outbox.send(conn, ServerLine::Error);
            Flow::Continue
        }
    }
}

/// `/nick <name>`
fn nick(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    nickname: String,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let previous = sessions.assign_nickname(conn, &nickname)?;
    outbox.send(conn, ServerLine::Ok);

    if let Some(old) = previous {
        let notice = ServerLine::Renamed { old, new: nickname };
        // Inside a room the whole room hears it, renamer included.
        match sessions.get(conn).and_then(|s| s.room()) {
            Some(room) => {
                broadcast(sessions, outbox, room, &notice, None);
            }
            None => outbox.send(conn, notice),
        }
    }
    Ok(Flow::Continue)
}

/// `/join <room>`
fn join(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    room: String,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let session = sessions.get_mut(conn).ok_or(SessionError::NotFound(conn))?;
    let nickname = session
        .nickname()
        .ok_or(SessionError::NoNickname(conn))?
        .to_string();
    let previous = session.enter(room.clone())?;

    // The sender is already out of `previous`, so excluding it is only
    // needed when re-joining the same room.
    if let Some(previous) = previous {
        let left = ServerLine::Left(nickname.clone());
        broadcast(sessions, outbox, &previous, &left, Some(conn));
    }
    outbox.send(conn, ServerLine::Ok);
    broadcast(sessions, outbox, &room, &ServerLine::Joined(nickname), Some(conn));
    Ok(Flow::Continue)
}

/// `/leave`
fn leave(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let session = sessions.get_mut(conn).ok_or(SessionError::NotFound(conn))?;
    let nickname = match session.state() {
        SessionState::InRoom { nickname, .. } => nickname.clone(),
        _ => return Err(SessionError::NotInRoom(conn)),
    };
    let room = session.leave()?;

    broadcast(sessions, outbox, &room, &ServerLine::Left(nickname), Some(conn));
    outbox.send(conn, ServerLine::Ok);
    Ok(Flow::Continue)
}

/// `/bye`
fn bye(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let session = sessions.get(conn).ok_or(SessionError::NotFound(conn))?;
    if let SessionState::InRoom { nickname, room } = session.state() {
        let left = ServerLine::Left(nickname.clone());
        broadcast(sessions, outbox, room, &left, Some(conn));
    }
    outbox.send(conn, ServerLine::Bye);
    Ok(Flow::Close)
}

/// `/priv <name> <text>`
fn private(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    to: String,
    text: String,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let sender = sessions
        .get(conn)
        .ok_or(SessionError::NotFound(conn))?
        .nickname()
        .ok_or(SessionError::NoNickname(conn))?
        .to_string();
    let recipient = sessions
        .find_by_nickname(&to)
        .ok_or(SessionError::UnknownNickname(to))?
        .id();

    let line = ServerLine::Private { from: sender, text };
    outbox.send(recipient, line.clone());
    outbox.send(conn, line);
    outbox.send(conn, ServerLine::Ok);
    Ok(Flow::Continue)
}

/// Plain chat text.
fn say(
    sessions: &mut SessionRegistry,
    conn: ConnectionId,
    text: String,
    outbox: &mut Outbox,
) -> Result<Flow, SessionError> {
    let session = sessions.get(conn).ok_or(SessionError::NotFound(conn))?;
    let SessionState::InRoom { nickname, room } = session.state() else {
        return Err(SessionError::NotInRoom(conn));
    };

    let chat = ServerLine::Chat {
        from: nickname.clone(),
        text,
    };
    broadcast(sessions, outbox, room, &chat, Some(conn));
    Ok(Flow::Continue)
}
