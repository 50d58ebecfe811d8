//! Thin terminal front end: stdin lines go out, server lines are printed.

use agora::cli::{init_tracing, ClientArgs};
use agora::{AgoraError, ChatClient};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AgoraError> {
    init_tracing();
    let args = ClientArgs::parse();

    let mut client = ChatClient::connect(&args.host, args.port).await?;
    let Some(mut receiver) = client.on_line(|line| println!("{line}")) else {
        return Ok(());
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            // The server hung up (after `/bye`, or it went away).
            _ = &mut receiver => break,
            line = stdin.next_line() => {
                match line? {
                    Some(line) => client.submit(&line).await?,
                    None => break,
                }
            }
        }
    }
    Ok(())
}
