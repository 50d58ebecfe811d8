//! Room broadcast over the session registry.

use agora_protocol::ServerLine;
use agora_session::SessionRegistry;
use agora_transport::ConnectionId;

use crate::Outbox;

/// Queues `line` for every session in `room`, skipping `exclude`.
///
/// Returns how many deliveries were queued. Broadcasting to a room nobody
/// is in queues nothing and is not an error. Recipients are visited in
/// registry order, which is unspecified.
pub fn broadcast(
    sessions: &SessionRegistry,
    outbox: &mut Outbox,
    room: &str,
    line: &ServerLine,
    exclude: Option<ConnectionId>,
) -> usize {
    let mut queued = 0;
    for session in sessions.in_room(room) {
        if Some(session.id()) == exclude {
            continue;
        }
        outbox.send(session.id(), line.clone());
        queued += 1;
    }
    tracing::trace!(room, queued, %line, "broadcast queued");
    queued
}
