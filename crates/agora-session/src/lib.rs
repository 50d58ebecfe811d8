//! Chat session management for Agora.
//!
//! This crate handles the per-connection side of the relay:
//!
//! 1. **Session state** — who a connection is and where it is
//!    ([`Session`], [`SessionState`], [`Phase`])
//! 2. **Session tracking** — the one registry of live sessions
//!    ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← resolves room names to the sessions inside them
//!     ↕
//! Session Layer (this crate)  ← nickname, room and phase per connection
//!     ↕
//! Transport Layer (below)  ← provides ConnectionId
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{Phase, Session, SessionState};
