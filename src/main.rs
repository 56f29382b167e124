//! `segwire` binary: send frames read from files and print the replies.

mod cli;

use std::{error::Error, time::Duration};

use clap::Parser;
use segwire::{Connection, Frame};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Library users install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let connection = Connection::open(&cli.addr).await?;

    for path in &cli.send {
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(file = %path.display(), bytes = bytes.len(), "sending frame");
        connection.send(bytes)?;
    }

    let timeout = Duration::from_millis(cli.timeout_ms);
    for index in 0..cli.expected_frames() {
        let frame = tokio::time::timeout(timeout, connection.receive())
            .await
            .map_err(|_| format!("no frame {index} within {timeout:?}"))??;
        println!("{}", describe(index, &frame));
    }

    connection.shutdown().await;
    Ok(())
}

fn describe(index: usize, frame: &Frame) -> String {
    format!(
        "frame {index}: {} bytes, segment words {:?}",
        frame.len(),
        frame.layout().segment_words()
    )
}
