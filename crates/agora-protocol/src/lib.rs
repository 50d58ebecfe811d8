//! Wire protocol for Agora.
//!
//! This crate defines the "language" that chat clients and the relay speak:
//!
//! - **Types** ([`Command`], [`ServerLine`]) — what a client can ask for and
//!   what the server can answer.
//! - **Codec** ([`Codec`] trait, [`LineCodec`]) — how one read's bytes
//!   become a line, and how a server line becomes bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding or
//!   parsing.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the command
//! interpreter. It doesn't know about sessions or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (line → Command) → Interpreter (session)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, LineCodec};
pub use error::ProtocolError;
pub use types::{escape_outgoing, Command, ServerLine, COMMAND_KEYWORDS};
