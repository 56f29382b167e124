//! Reader and writer tasks driving one socket.

use std::{io, sync::Arc};

use bytes::Bytes;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::tcp::{OwnedReadHalf, OwnedWriteHalf},
    sync::mpsc,
};

use super::Shared;
use crate::{
    error::EndReason,
    metrics::{self, Direction},
    reassembly::Reassembler,
};

/// Read chunks until the peer closes, the socket fails, a header is
/// malformed, or the connection is cancelled.
///
/// Every completed frame is delivered before the next read is issued.
pub(super) async fn read_loop(
    mut reader: OwnedReadHalf,
    shared: Arc<Shared>,
    mut reassembler: Reassembler,
    chunk_size: usize,
) {
    let mut chunk = vec![0_u8; chunk_size];
    let reason = loop {
        let read = tokio::select! {
            biased;
            () = shared.shutdown.cancelled() => {
                reassembler.clear();
                return;
            }
            read = reader.read(&mut chunk) => read,
        };
        match read {
            Ok(0) => break EndReason::from(reassembler.finish()),
            Ok(n) => {
                let fed = reassembler.feed_with(&chunk[..n], |frame| {
                    metrics::record_frame(Direction::Inbound, frame.len());
                    shared.queue.deliver(frame);
                });
                match fed {
                    Ok(frames) => {
                        tracing::trace!(bytes = n, frames, buffered = reassembler.buffered(), "read chunk");
                    }
                    Err(err) => break EndReason::Framing(err),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => break EndReason::from_io(&err),
        }
    };
    shared.terminate(reason);
}

/// Write queued frames verbatim, in the order they were sent.
///
/// Frames still queued when the connection ends are dropped. The write half
/// is shut down on exit so the peer observes end of stream.
pub(super) async fn write_loop(
    mut writer: OwnedWriteHalf,
    shared: Arc<Shared>,
    mut outbound: mpsc::UnboundedReceiver<Bytes>,
) {
    loop {
        let bytes = tokio::select! {
            biased;
            () = shared.shutdown.cancelled() => break,
            next = outbound.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
        };
        let written = tokio::select! {
            biased;
            () = shared.shutdown.cancelled() => break,
            written = writer.write_all(&bytes) => written,
        };
        if let Err(err) = written {
            shared.terminate(EndReason::from_io(&err));
            break;
        }
        metrics::record_frame(Direction::Outbound, bytes.len());
    }
    outbound.close();
    if let Err(err) = writer.shutdown().await {
        tracing::debug!(error = %err, "failed to shut down write half");
    }
}
