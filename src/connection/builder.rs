//! Builder for [`Connection`].

use std::{io, net::SocketAddr, time::Duration};

use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tracing::Instrument;

use super::{
    Connection,
    address::HostPort,
    config::SocketOptions,
    tracing_config::TracingConfig,
    tracing_helpers::{emit_timing_event, open_span, start_timer},
};
use crate::{
    error::{ConnectionError, Result},
    frame::FrameLimits,
    reassembly::Reassembler,
};

/// Bytes requested from the socket per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Configures and opens a [`Connection`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use segwire::{Connection, frame::FrameLimits};
///
/// # async fn demo() -> segwire::Result<()> {
/// let connection = Connection::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .frame_limits(FrameLimits::default().max_segments(64))
///     .connect("localhost:50051")
///     .await?;
/// # drop(connection);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConnectionBuilder {
    socket_options: SocketOptions,
    limits: FrameLimits,
    connect_timeout: Option<Duration>,
    read_chunk_size: usize,
    pub(crate) tracing_config: TracingConfig,
}

impl Default for ConnectionBuilder {
    fn default() -> Self { Self::new() }
}

impl ConnectionBuilder {
    /// Create a builder with default settings: `TCP_NODELAY` on, default
    /// frame limits, no connect timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            socket_options: SocketOptions::default(),
            limits: FrameLimits::default(),
            connect_timeout: None,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            tracing_config: TracingConfig::default(),
        }
    }

    /// Replace the socket options.
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.socket_options = options;
        self
    }

    /// Configure `TCP_NODELAY`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.socket_options = self.socket_options.nodelay(enabled);
        self
    }

    /// Configure TCP keepalive.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.socket_options = self.socket_options.keepalive(idle);
        self
    }

    /// Limits applied to every inbound header.
    #[must_use]
    pub fn frame_limits(mut self, limits: FrameLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fail with [`ConnectionError::ConnectTimeout`] if establishing the
    /// connection takes longer than `timeout`.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Maximum bytes requested per socket read. Clamped to at least one.
    #[must_use]
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Replace the tracing configuration.
    #[must_use]
    pub fn tracing_config(mut self, config: TracingConfig) -> Self {
        self.tracing_config = config;
        self
    }

    /// Configured socket options.
    #[must_use]
    pub const fn socket_options_value(&self) -> &SocketOptions { &self.socket_options }

    /// Configured frame limits.
    #[must_use]
    pub const fn frame_limits_value(&self) -> &FrameLimits { &self.limits }

    /// Configured connect timeout.
    #[must_use]
    pub const fn connect_timeout_value(&self) -> Option<Duration> { self.connect_timeout }

    /// Configured read chunk size.
    #[must_use]
    pub const fn read_chunk_size_value(&self) -> usize { self.read_chunk_size }

    pub(crate) fn reassembler(&self) -> Reassembler { Reassembler::new(self.limits) }

    /// Resolve `address` and connect to the first reachable candidate.
    ///
    /// The address is validated before any lookup or socket is made.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::InvalidAddress`] if `address` is not `host:port`.
    /// - [`ConnectionError::Resolve`] if the host does not resolve.
    /// - [`ConnectionError::Connect`] if no candidate accepts the connection.
    /// - [`ConnectionError::ConnectTimeout`] if the timeout elapses first.
    pub async fn connect(&self, address: &str) -> Result<Connection> {
        let span = open_span(&self.tracing_config, address);
        let timer = start_timer(self.tracing_config.open_timing);
        let result = self.establish(address).instrument(span.clone()).await;
        span.record("result", if result.is_ok() { "ok" } else { "error" });
        span.in_scope(|| emit_timing_event(timer));
        result
    }

    async fn establish(&self, address: &str) -> Result<Connection> {
        let target: HostPort = address
            .parse()
            .map_err(|reason| ConnectionError::InvalidAddress {
                address: address.to_owned(),
                reason,
            })?;
        let candidates: Vec<SocketAddr> = lookup_host((target.host(), target.port()))
            .await
            .map_err(|source| ConnectionError::Resolve {
                address: address.to_owned(),
                source,
            })?
            .collect();
        if candidates.is_empty() {
            return Err(ConnectionError::Resolve {
                address: address.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"),
            });
        }

        let attempt = self.connect_any(&candidates);
        let connected = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, attempt).await.map_err(|_| {
                ConnectionError::ConnectTimeout {
                    address: address.to_owned(),
                    timeout,
                }
            })?,
            None => attempt.await,
        };
        let (stream, peer_addr) = connected.map_err(|source| ConnectionError::Connect {
            address: address.to_owned(),
            source,
        })?;
        tracing::debug!(peer = %peer_addr, "connected");
        Ok(Connection::spawn(stream, peer_addr, self))
    }

    async fn connect_any(&self, candidates: &[SocketAddr]) -> io::Result<(TcpStream, SocketAddr)> {
        let mut last_error = None;
        for &candidate in candidates {
            match self.connect_one(candidate).await {
                Ok(stream) => return Ok((stream, candidate)),
                Err(err) => {
                    tracing::debug!(peer = %candidate, error = %err, "connect attempt failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses to try")))
    }

    async fn connect_one(&self, candidate: SocketAddr) -> io::Result<TcpStream> {
        let socket = if candidate.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        self.socket_options.apply(&socket)?;
        socket.connect(candidate).await
    }
}
