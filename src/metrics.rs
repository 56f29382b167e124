//! Metric names and recording helpers.
//!
//! Recording goes through the [`metrics`](https://docs.rs/metrics) facade when
//! the `metrics` feature is enabled and compiles to nothing otherwise.

/// Gauge of currently open connections.
pub const CONNECTIONS_ACTIVE: &str = "segwire_connections_active";
/// Counter of frames moved across connections, labelled by `direction`.
pub const FRAMES_PROCESSED: &str = "segwire_frames_processed_total";
/// Counter of bytes moved across connections, labelled by `direction`.
pub const BYTES_PROCESSED: &str = "segwire_bytes_processed_total";
/// Counter of connections that ended abnormally, labelled by `reason`.
pub const ERRORS_TOTAL: &str = "segwire_errors_total";

/// Direction of frame flow relative to this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames read from the peer.
    Inbound,
    /// Frames written to the peer.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

#[cfg(feature = "metrics")]
mod record {
    use metrics::{counter, gauge};

    use super::{BYTES_PROCESSED, CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};

    pub fn inc_connections() { gauge!(CONNECTIONS_ACTIVE).increment(1.0); }

    pub fn dec_connections() { gauge!(CONNECTIONS_ACTIVE).decrement(1.0); }

    pub fn record_frame(direction: Direction, bytes: usize) {
        counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
        counter!(BYTES_PROCESSED, "direction" => direction.as_str())
            .increment(u64::try_from(bytes).unwrap_or(u64::MAX));
    }

    pub fn inc_errors(reason: &'static str) {
        counter!(ERRORS_TOTAL, "reason" => reason).increment(1);
    }
}

#[cfg(not(feature = "metrics"))]
mod record {
    use super::Direction;

    pub fn inc_connections() {}

    pub fn dec_connections() {}

    pub fn record_frame(_direction: Direction, _bytes: usize) {}

    pub fn inc_errors(_reason: &'static str) {}
}

/// Increment the active connections gauge.
pub fn inc_connections() { record::inc_connections(); }

/// Decrement the active connections gauge.
pub fn dec_connections() { record::dec_connections(); }

/// Record one frame of `bytes` length moving in `direction`.
pub fn record_frame(direction: Direction, bytes: usize) { record::record_frame(direction, bytes); }

/// Record a connection that ended for `reason`.
pub fn inc_errors(reason: &'static str) { record::inc_errors(reason); }
