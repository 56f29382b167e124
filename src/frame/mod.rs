//! Segment frames and the pure decoder that delimits them.
//!
//! A [`Frame`] is an immutable byte range holding a header and every
//! segment payload. Frames are produced by the
//! [`Reassembler`](crate::reassembly::Reassembler) for inbound traffic and
//! by [`FrameBuilder`] for outbound traffic.

mod decode;
mod header;

use bytes::Bytes;
pub use decode::{
    DEFAULT_MAX_FRAME_LENGTH,
    DEFAULT_MAX_SEGMENTS,
    FrameLimits,
    FrameStatus,
    decode,
};
pub use header::{
    COUNT_FIELD_SIZE,
    FrameBuilder,
    FrameLayout,
    LENGTH_FIELD_SIZE,
    WORD_SIZE,
    align_to_word,
    aligned_header_len,
};

/// A complete, self-delimited frame.
///
/// The segment contents are never interpreted; the frame only knows where
/// each segment starts and ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
    layout: FrameLayout,
}

impl Frame {
    /// `bytes` must hold exactly `layout.total_len()` bytes.
    pub(crate) fn new(bytes: Bytes, layout: FrameLayout) -> Self {
        debug_assert_eq!(bytes.len(), layout.total_len());
        Self { bytes, layout }
    }

    /// Raw frame bytes, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Consume the frame, returning its raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.bytes }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Frames always carry a header, so this is never `true`.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Parsed segment table.
    #[must_use]
    pub const fn layout(&self) -> &FrameLayout { &self.layout }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.layout.segment_count() }

    /// Borrow the payload of segment `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&[u8]> {
        self.layout
            .segment_range(index)
            .and_then(|range| self.bytes.get(range))
    }

    /// Iterate over segment payloads in order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.segment_count()).map(|index| self.segment(index).unwrap_or_default())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self { frame.bytes }
}

#[cfg(test)]
mod tests;
