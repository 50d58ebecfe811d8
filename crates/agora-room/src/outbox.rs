//! The outbox: lines waiting to be written, in the order they were queued.
//!
//! Command handling never touches sockets. It fills an [`Outbox`] and the
//! event loop writes it out afterwards, one [`Delivery`] at a time, so the
//! reply ordering a command produces is exactly the ordering on the wire.

use agora_protocol::ServerLine;
use agora_transport::ConnectionId;

/// One line addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Who receives the line.
    pub to: ConnectionId,
    /// What they receive.
    pub line: ServerLine,
}

/// An ordered queue of [`Delivery`]s.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `line` for `to`.
    pub fn send(&mut self, to: ConnectionId, line: ServerLine) {
        self.deliveries.push(Delivery { to, line });
    }

    /// The queued deliveries, oldest first.
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Lines queued for one connection, oldest first.
    pub fn lines_for(
        &self,
        to: ConnectionId,
    ) -> impl Iterator<Item = &ServerLine> {
        self.deliveries
            .iter()
            .filter(move |d| d.to == to)
            .map(|d| &d.line)
    }

    /// Returns the number of queued deliveries.
    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

impl IntoIterator for Outbox {
    type Item = Delivery;
    type IntoIter = std::vec::IntoIter<Delivery>;

    fn into_iter(self) -> Self::IntoIter {
        self.deliveries.into_iter()
    }
}
