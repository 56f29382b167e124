//! Segment table layout shared by the decoder and the frame builder.
//!
//! A frame header is a `u32` holding `segment_count - 1`, followed by one
//! `u32` word count per segment, zero-padded to an 8-byte boundary.

use std::ops::Range;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{byte_order::write_le_u32, codec::FramingError};

/// Size of a segment word in bytes.
pub const WORD_SIZE: usize = 8;

/// Size of the segment count field in bytes.
pub const COUNT_FIELD_SIZE: usize = 4;

/// Size of one segment length field in bytes.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Round `len` up to the next multiple of [`WORD_SIZE`].
///
/// Returns `None` if the rounded value does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use segwire::frame::align_to_word;
///
/// assert_eq!(align_to_word(8), Some(8));
/// assert_eq!(align_to_word(12), Some(16));
/// assert_eq!(align_to_word(0), Some(0));
/// ```
#[must_use]
pub const fn align_to_word(len: usize) -> Option<usize> {
    match len.checked_add(WORD_SIZE - 1) {
        Some(padded) => Some(padded & !(WORD_SIZE - 1)),
        None => None,
    }
}

/// Aligned header length for a frame with `segment_count` segments.
///
/// # Examples
///
/// ```
/// use segwire::frame::aligned_header_len;
///
/// assert_eq!(aligned_header_len(1), Some(8));
/// assert_eq!(aligned_header_len(2), Some(16));
/// assert_eq!(aligned_header_len(3), Some(16));
/// ```
#[must_use]
pub fn aligned_header_len(segment_count: usize) -> Option<usize> {
    let fields = segment_count.checked_mul(LENGTH_FIELD_SIZE)?;
    align_to_word(fields.checked_add(COUNT_FIELD_SIZE)?)
}

/// Parsed segment table of a complete frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    segment_words: Vec<u32>,
    header_len: usize,
    total_len: usize,
}

impl FrameLayout {
    /// Build a layout from segment word counts.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::LengthOverflow`] if the frame size does not
    /// fit in `usize`.
    pub(crate) fn from_words(segment_words: Vec<u32>) -> Result<Self, FramingError> {
        let header_len =
            aligned_header_len(segment_words.len()).ok_or(FramingError::LengthOverflow)?;
        let payload_words: u64 = segment_words.iter().map(|&w| u64::from(w)).sum();
        let total_len = payload_words
            .checked_mul(WORD_SIZE as u64)
            .and_then(|payload| usize::try_from(payload).ok())
            .and_then(|payload| payload.checked_add(header_len))
            .ok_or(FramingError::LengthOverflow)?;
        Ok(Self {
            segment_words,
            header_len,
            total_len,
        })
    }

    /// Number of segments in the frame.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.segment_words.len() }

    /// Declared length of each segment in 8-byte words.
    #[must_use]
    pub fn segment_words(&self) -> &[u32] { &self.segment_words }

    /// Header length including padding.
    #[must_use]
    pub const fn header_len(&self) -> usize { self.header_len }

    /// Bytes occupied by segment payloads.
    #[must_use]
    pub const fn payload_len(&self) -> usize { self.total_len - self.header_len }

    /// Total frame length in bytes.
    #[must_use]
    pub const fn total_len(&self) -> usize { self.total_len }

    /// Byte range of segment `index` within the frame.
    #[must_use]
    pub fn segment_range(&self, index: usize) -> Option<Range<usize>> {
        let words = *self.segment_words.get(index)?;
        let start = self.segment_words[..index]
            .iter()
            .map(|&w| w as usize * WORD_SIZE)
            .sum::<usize>()
            + self.header_len;
        Some(start..start + words as usize * WORD_SIZE)
    }

    /// Write the header bytes, including padding, into `dst`.
    pub(crate) fn write_header(&self, dst: &mut BytesMut) {
        let start = dst.len();
        // Layouts always hold at least one segment, so the subtraction is safe.
        let count_field = u32::try_from(self.segment_words.len() - 1).unwrap_or(u32::MAX);
        dst.put_slice(&write_le_u32(count_field));
        for &words in &self.segment_words {
            dst.put_slice(&write_le_u32(words));
        }
        let written = dst.len() - start;
        dst.put_bytes(0, self.header_len - written);
    }
}

/// Builder producing outbound frames from segment payloads.
///
/// Segments are padded with zero bytes up to the next word boundary. A
/// builder with no segments produces a frame holding one empty segment.
///
/// # Examples
///
/// ```
/// use segwire::frame::FrameBuilder;
///
/// let frame = FrameBuilder::new()
///     .segment(vec![1_u8; 16])
///     .build()
///     .expect("frame fits");
/// assert_eq!(frame.len(), 24);
/// assert_eq!(frame.segment(0), Some(&[1_u8; 16][..]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FrameBuilder {
    segments: Vec<Bytes>,
}

impl FrameBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a segment payload.
    #[must_use]
    pub fn segment(mut self, payload: impl Into<Bytes>) -> Self {
        self.segments.push(payload.into());
        self
    }

    /// Encode the header and segments into a [`Frame`](super::Frame).
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::LengthOverflow`] if a segment is too large for
    /// a `u32` word count or the segment count does not fit the count field.
    pub fn build(self) -> Result<super::Frame, FramingError> {
        let segments = if self.segments.is_empty() {
            vec![Bytes::new()]
        } else {
            self.segments
        };
        if u32::try_from(segments.len() - 1).is_err() {
            return Err(FramingError::LengthOverflow);
        }
        let words = segments
            .iter()
            .map(|segment| {
                let padded = align_to_word(segment.len()).ok_or(FramingError::LengthOverflow)?;
                u32::try_from(padded / WORD_SIZE).map_err(|_| FramingError::LengthOverflow)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let layout = FrameLayout::from_words(words)?;

        let mut dst = BytesMut::with_capacity(layout.total_len());
        layout.write_header(&mut dst);
        for segment in &segments {
            dst.put_slice(segment);
            let padding = align_to_word(segment.len()).unwrap_or(segment.len()) - segment.len();
            dst.put_bytes(0, padding);
        }
        Ok(super::Frame::new(dst.freeze(), layout))
    }
}
