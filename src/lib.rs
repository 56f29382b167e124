#![doc(html_root_url = "https://docs.rs/segwire/latest")]
//! Client transport for segment-framed RPC streams.
//!
//! Peers exchange frames in the unpacked Cap'n Proto stream layout: a
//! little-endian segment count, one word-length per segment, padding to an
//! eight-byte boundary, then the segment payloads. This crate turns an
//! arbitrarily chunked TCP byte stream back into those frames and hands them
//! to callers in arrival order. It never interprets segment contents.
//!
//! - [`frame`] delimits frames and builds outbound ones.
//! - [`reassembly`] buffers socket chunks and extracts complete frames.
//! - [`delivery`] pairs frames with waiting receivers.
//! - [`connection`] owns the socket and its reader and writer tasks.
//! - [`codec`] exposes the same framing as a `tokio_util` codec.

pub mod byte_order;
pub mod codec;
pub mod connection;
pub mod delivery;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod reassembly;

pub use codec::{EofError, FramingError, SegmentFrameCodec};
pub use connection::{Connection, ConnectionBuilder};
pub use delivery::ConnectionState;
pub use error::{ConnectionError, EndReason, Result};
pub use frame::{Frame, FrameBuilder, FrameLimits};
pub use metrics::{BYTES_PROCESSED, CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};
