//! Client connection carrying segment frames over TCP.
//!
//! A [`Connection`] owns one socket and two background tasks. The reader
//! task feeds socket bytes through a
//! [`Reassembler`](crate::reassembly::Reassembler) and hands each frame to
//! the [`DeliveryQueue`]. The writer task drains frames queued by
//! [`Connection::send`] and writes them verbatim.
//!
//! The connection ends exactly once, on local close, peer end of stream, a
//! socket error, or a malformed header. Every pending and later call then
//! fails with the same [`EndReason`].

mod address;
mod builder;
mod config;
mod io;
mod tracing_config;
mod tracing_helpers;

use std::{net::SocketAddr, sync::Arc};

pub use address::{AddressError, HostPort};
pub use builder::{ConnectionBuilder, DEFAULT_READ_CHUNK_SIZE};
use bytes::Bytes;
pub use config::SocketOptions;
use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::Instrument;
pub use tracing_config::TracingConfig;
use tracing_helpers::{close_span, emit_timing_event, receive_span, send_span, start_timer};

use crate::{
    delivery::{ConnectionState, DeliveryQueue},
    error::{ConnectionError, EndReason, Result},
    frame::Frame,
    metrics,
};

/// State shared between a connection handle and its tasks.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) queue: DeliveryQueue,
    pub(crate) shutdown: CancellationToken,
    peer_addr: SocketAddr,
}

impl Shared {
    fn new(peer_addr: SocketAddr) -> Self {
        Self {
            queue: DeliveryQueue::new(),
            shutdown: CancellationToken::new(),
            peer_addr,
        }
    }

    /// End the connection with `reason` and stop both tasks.
    ///
    /// Returns `false` if the connection had already ended.
    pub(crate) fn terminate(&self, reason: EndReason) -> bool {
        if !self.queue.end(reason.clone()) {
            return false;
        }
        self.shutdown.cancel();
        metrics::dec_connections();
        if reason.is_clean() {
            tracing::info!(peer = %self.peer_addr, reason = reason.kind_str(), "connection ended");
        } else {
            metrics::inc_errors(reason.kind_str());
            tracing::warn!(peer = %self.peer_addr, error = %reason, "connection failed");
        }
        true
    }
}

/// An open client connection.
///
/// Dropping the connection closes it.
///
/// # Examples
///
/// ```no_run
/// use segwire::{Connection, FrameBuilder};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let connection = Connection::open("127.0.0.1:50051").await?;
/// let request = FrameBuilder::new().segment(vec![0_u8; 16]).build()?;
/// connection.send(request)?;
/// let reply = connection.receive().await?;
/// println!("{} segments", reply.segment_count());
/// connection.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<Bytes>,
    tasks: TaskTracker,
    tracing_config: TracingConfig,
}

impl Connection {
    /// Connect to `address` (`host:port`) with default settings.
    ///
    /// # Errors
    ///
    /// See [`ConnectionBuilder::connect`].
    pub async fn open(address: &str) -> Result<Self> { Self::builder().connect(address).await }

    /// Start configuring a connection.
    #[must_use]
    pub fn builder() -> ConnectionBuilder { ConnectionBuilder::new() }

    /// Spawn the reader and writer tasks for an established stream.
    pub(crate) fn spawn(
        stream: tokio::net::TcpStream,
        peer_addr: SocketAddr,
        builder: &ConnectionBuilder,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        let shared = Arc::new(Shared::new(peer_addr));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let tasks = TaskTracker::new();

        metrics::inc_connections();
        tasks.spawn(io::read_loop(
            reader,
            Arc::clone(&shared),
            builder.reassembler(),
            builder.read_chunk_size_value(),
        ));
        tasks.spawn(io::write_loop(writer, Arc::clone(&shared), outbound_rx));
        tasks.close();

        Self {
            shared,
            outbound,
            tasks,
            tracing_config: builder.tracing_config.clone(),
        }
    }

    /// Queue `frame` for writing without waiting for the socket.
    ///
    /// The bytes are written verbatim and in call order; callers supply
    /// complete frames, typically built with
    /// [`FrameBuilder`](crate::FrameBuilder).
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Ended`] once the connection has ended.
    pub fn send(&self, frame: impl Into<Bytes>) -> Result<()> {
        let bytes = frame.into();
        let span = send_span(&self.tracing_config, bytes.len());
        let _guard = span.enter();
        let timer = start_timer(self.tracing_config.send_timing);

        if let Some(reason) = self.shared.queue.end_reason() {
            return Err(reason.into());
        }
        if self.outbound.send(bytes).is_err() {
            return Err(self.ended_error());
        }
        emit_timing_event(timer);
        Ok(())
    }

    /// Receive the next inbound frame.
    ///
    /// Returns immediately when a frame is already queued. Concurrent callers
    /// are served in the order they started waiting. Dropping the future
    /// gives up the place in line without losing a frame.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Ended`] when the connection ends before a
    /// frame arrives.
    pub async fn receive(&self) -> Result<Frame> {
        let span = receive_span(&self.tracing_config);
        let timer = start_timer(self.tracing_config.receive_timing);
        let result = self.shared.queue.receive().instrument(span.clone()).await;
        match &result {
            Ok(frame) => {
                span.record("frame.bytes", frame.len());
                span.record("result", "ok");
            }
            Err(reason) => {
                span.record("result", reason.kind_str());
            }
        }
        span.in_scope(|| emit_timing_event(timer));
        result.map_err(ConnectionError::from)
    }

    /// Close the connection.
    ///
    /// Waiting receivers fail with [`EndReason::Closed`], queued inbound
    /// frames and unsent outbound frames are dropped, and both tasks stop.
    /// Calling `close` again, or after the connection ended for another
    /// reason, has no effect.
    pub fn close(&self) {
        let span = close_span(&self.tracing_config);
        let _guard = span.enter();
        let timer = start_timer(self.tracing_config.close_timing);
        self.shared.terminate(EndReason::Closed);
        emit_timing_event(timer);
    }

    /// Close the connection and wait for both tasks to release the socket.
    pub async fn shutdown(&self) {
        self.close();
        self.tasks.wait().await;
    }

    /// Wait until the connection ends and return why.
    pub async fn closed(&self) -> EndReason { self.shared.queue.ended().await }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.shared.queue.state() }

    /// Returns `true` until the connection ends.
    #[must_use]
    pub fn is_open(&self) -> bool { self.state().is_open() }

    /// Address of the peer.
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr { self.shared.peer_addr }

    fn ended_error(&self) -> ConnectionError {
        ConnectionError::Ended(self.shared.queue.end_reason().unwrap_or(EndReason::Closed))
    }
}

impl Drop for Connection {
    fn drop(&mut self) { self.shared.terminate(EndReason::Closed); }
}

#[cfg(test)]
mod tests;
