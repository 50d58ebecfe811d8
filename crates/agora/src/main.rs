use agora::cli::{init_tracing, ServerArgs};
use agora::{AgoraError, AgoraServer};
use clap::Parser;

// One OS thread for the whole relay: the event loop and every read pump.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AgoraError> {
    init_tracing();
    // A missing or non-numeric port exits here with a usage error.
    let args = ServerArgs::parse();

    let server = AgoraServer::builder()
        .bind(&args.bind_addr())
        .build()
        .await?;
    server.run().await
}
