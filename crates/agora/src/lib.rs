//! # Agora
//!
//! A single-threaded, multi-room chat relay speaking a newline-terminated
//! text protocol over TCP.
//!
//! Clients pick a nickname with `/nick`, enter a room with `/join`, chat
//! with plain lines, whisper with `/priv` and quit with `/bye`. The server
//! keeps one session per connection and relays every line from a single
//! event loop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agora::prelude::*;
//!
//! # async fn start() -> Result<(), AgoraError> {
//! let server = AgoraServer::builder()
//!     .bind("0.0.0.0:4000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

pub mod cli;
mod client;
mod error;
mod interpreter;
mod server;

pub use client::ChatClient;
pub use error::AgoraError;
pub use interpreter::{interpret, Flow};
pub use server::{AgoraServer, AgoraServerBuilder};

/// Everything needed to run or talk to a relay.
pub mod prelude {
    pub use crate::{AgoraError, AgoraServer, AgoraServerBuilder, ChatClient};
    pub use agora_protocol::{Command, ServerLine};
    pub use agora_session::{Phase, SessionRegistry};
    pub use agora_transport::ConnectionId;
}
