//! Command-line arguments and logging setup shared by the binaries.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// `agora-server <port>`
#[derive(Debug, Clone, Parser)]
#[command(name = "agora-server", about = "Multi-room line-protocol chat relay")]
pub struct ServerArgs {
    /// TCP port to listen on.
    pub port: u16,
}

impl ServerArgs {
    /// The address the server binds: every interface, on `port`.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// `agora-client <host> <port>`
#[derive(Debug, Clone, Parser)]
#[command(name = "agora-client", about = "Terminal client for an Agora relay")]
pub struct ClientArgs {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

/// Installs the `tracing` subscriber for a binary.
///
/// Verbosity comes from `RUST_LOG` and defaults to `info`. Logs go to
/// stderr so a client's stdout only carries chat.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
