//! `tokio_util` codec for segment frames.
//!
//! [`SegmentFrameCodec`] plugs the pure [`decode`](crate::frame::decode)
//! function into [`Decoder`] and [`Encoder`] so segment frames can be read
//! and written through [`Framed`](tokio_util::codec::Framed). Outbound
//! frames are written verbatim; the codec never rewrites headers.
//!
//! # Error Handling
//!
//! Framing failures surface as [`FramingError`] wrapped in an
//! [`io::Error`] of kind [`io::ErrorKind::InvalidData`]. A stream that ends
//! inside a frame reports [`EofError`] with kind
//! [`io::ErrorKind::UnexpectedEof`].

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    byte_order::read_le_u32_at,
    frame::{COUNT_FIELD_SIZE, Frame, FrameLimits, FrameStatus, aligned_header_len, decode},
};

pub mod error;

pub use error::{EofError, FramingError};

/// Upper bound on the buffer growth requested for a partially received frame.
const MAX_RESERVE: usize = 64 * 1024;

/// Codec delimiting unpacked segment frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentFrameCodec {
    limits: FrameLimits,
}

impl SegmentFrameCodec {
    /// Construct a codec enforcing `limits` on inbound headers.
    #[must_use]
    pub const fn new(limits: FrameLimits) -> Self { Self { limits } }

    /// Limits applied while decoding.
    #[must_use]
    pub const fn limits(&self) -> &FrameLimits { &self.limits }
}

/// Split the first complete frame off `src`, if any.
///
/// Shared by the codec and the [`Reassembler`](crate::reassembly::Reassembler).
pub(crate) fn split_frame(
    src: &mut BytesMut,
    limits: &FrameLimits,
) -> Result<Option<Frame>, FramingError> {
    match decode(&src[..], limits)? {
        FrameStatus::Incomplete { needed } => {
            src.reserve(needed.min(MAX_RESERVE));
            Ok(None)
        }
        FrameStatus::Complete(layout) => {
            let bytes = src.split_to(layout.total_len()).freeze();
            Ok(Some(Frame::new(bytes, layout)))
        }
    }
}

/// Classify leftover bytes at end of stream.
///
/// `src` must not start with a complete frame.
pub(crate) fn classify_eof(src: &[u8], limits: &FrameLimits) -> EofError {
    if src.is_empty() {
        return EofError::CleanClose;
    }
    let header_size = read_le_u32_at(src, 0)
        .and_then(|raw| usize::try_from(raw).ok()?.checked_add(1))
        .and_then(aligned_header_len)
        .unwrap_or(COUNT_FIELD_SIZE);
    if src.len() < header_size {
        return EofError::MidHeader {
            bytes_received: src.len(),
            header_size,
        };
    }
    let expected = match decode(src, limits) {
        Ok(FrameStatus::Incomplete { needed }) => src.len() + needed,
        Ok(FrameStatus::Complete(_)) | Err(_) => src.len(),
    };
    EofError::MidFrame {
        bytes_received: src.len(),
        expected,
    }
}

impl Decoder for SegmentFrameCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        split_frame(src, &self.limits).map_err(io::Error::from)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        match classify_eof(&src[..], &self.limits) {
            EofError::CleanClose => Ok(None),
            err => {
                tracing::debug!(error = %err, "stream ended inside a frame");
                Err(err.into())
            }
        }
    }
}

impl Encoder<Frame> for SegmentFrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

impl Encoder<Bytes> for SegmentFrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}
