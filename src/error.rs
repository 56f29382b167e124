//! Canonical error types for the crate.
//!
//! [`EndReason`] records why a connection reached its terminal state and is
//! handed to every receiver that was waiting at the time. [`ConnectionError`]
//! is the single error surface of [`Connection`](crate::Connection).

use std::{io, time::Duration};

use thiserror::Error;

use crate::{
    codec::{EofError, FramingError},
    connection::AddressError,
};

/// Why a connection ended.
///
/// Clean closes and failures are kept apart so callers can tell a peer that
/// hung up between frames from one that vanished mid-frame or a socket that
/// failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EndReason {
    /// `close` was called on this side.
    #[error("connection closed locally")]
    Closed,
    /// The peer closed the stream on a frame boundary.
    #[error("connection closed by peer")]
    PeerClosed,
    /// The peer closed the stream inside a frame.
    #[error("stream truncated: {0}")]
    Truncated(EofError),
    /// An inbound header was malformed.
    #[error("malformed frame: {0}")]
    Framing(FramingError),
    /// A read or write on the socket failed.
    #[error("socket error ({kind}): {message}")]
    Io {
        /// Kind of the underlying I/O error.
        kind: io::ErrorKind,
        /// Rendered I/O error.
        message: String,
    },
}

impl EndReason {
    /// Capture an I/O error as an end reason.
    #[must_use]
    pub fn from_io(err: &io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Returns `true` when the connection ended without losing data.
    ///
    /// # Examples
    ///
    /// ```
    /// use segwire::EndReason;
    ///
    /// assert!(EndReason::Closed.is_clean());
    /// assert!(EndReason::PeerClosed.is_clean());
    /// assert!(!EndReason::from_io(&std::io::Error::other("reset")).is_clean());
    /// ```
    #[must_use]
    pub const fn is_clean(&self) -> bool { matches!(self, Self::Closed | Self::PeerClosed) }

    /// Category label for logs and metrics.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::PeerClosed => "peer_closed",
            Self::Truncated(_) => "truncated",
            Self::Framing(_) => "framing",
            Self::Io { .. } => "io",
        }
    }
}

impl From<FramingError> for EndReason {
    fn from(err: FramingError) -> Self { Self::Framing(err) }
}

impl From<EofError> for EndReason {
    fn from(err: EofError) -> Self {
        match err {
            EofError::CleanClose => Self::PeerClosed,
            truncated => Self::Truncated(truncated),
        }
    }
}

/// Errors emitted by [`Connection`](crate::Connection).
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The address is not of the form `host:port`.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress {
        /// Address as supplied by the caller.
        address: String,
        /// What was wrong with it.
        reason: AddressError,
    },
    /// Name resolution failed or returned no addresses.
    #[error("failed to resolve '{address}'")]
    Resolve {
        /// Address as supplied by the caller.
        address: String,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// The TCP connection could not be established.
    #[error("failed to connect to {address}")]
    Connect {
        /// Address as supplied by the caller.
        address: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Connecting took longer than the configured timeout.
    #[error("connect to {address} timed out after {timeout:?}")]
    ConnectTimeout {
        /// Address as supplied by the caller.
        address: String,
        /// Configured timeout.
        timeout: Duration,
    },
    /// The connection has ended; no further frames can be sent or received.
    #[error("connection ended: {0}")]
    Ended(#[from] EndReason),
}

impl ConnectionError {
    /// The end reason, if this error reports a terminated connection.
    #[must_use]
    pub const fn end_reason(&self) -> Option<&EndReason> {
        match self {
            Self::Ended(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = ConnectionError> = std::result::Result<T, E>;
