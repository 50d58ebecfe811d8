//! Rooms and room broadcast for Agora.
//!
//! A room is not stored anywhere: it is the set of sessions whose room name
//! matches. It exists while at least one session is in it and there is no
//! event for its creation or disappearance.
//!
//! # Key types
//!
//! - [`Outbox`] — the ordered list of lines a command wants written
//! - [`Delivery`] — one line for one connection
//! - [`broadcast`] — queue a line for every member of a room

mod broadcast;
mod outbox;

pub use broadcast::broadcast;
pub use outbox::{Delivery, Outbox};
