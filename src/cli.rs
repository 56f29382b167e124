//! Command line interface for the `segwire` binary.
//!
//! Shared with `build.rs`, which renders the man page from it.

use std::path::PathBuf;

use clap::Parser;

/// Send pre-encoded segment frames to a peer and print the replies.
#[derive(Debug, Parser)]
#[command(name = "segwire", version, about = "Exchange segment frames with an RPC peer")]
pub struct Cli {
    /// Peer address as `host:port`.
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    pub addr: String,

    /// File holding one complete frame to send. May be repeated.
    #[arg(short, long = "send", value_name = "FILE")]
    pub send: Vec<PathBuf>,

    /// Number of frames to wait for. Defaults to one per sent frame.
    #[arg(short, long)]
    pub expect: Option<usize>,

    /// Give up waiting for each frame after this many milliseconds.
    #[arg(short, long = "timeout-ms", default_value_t = 5000)]
    pub timeout_ms: u64,
}

impl Cli {
    /// Number of frames to wait for.
    #[must_use]
    pub fn expected_frames(&self) -> usize { self.expect.unwrap_or(self.send.len()) }
}
