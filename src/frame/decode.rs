//! Pure frame boundary detection.
//!
//! [`decode`] inspects the front of a buffer and reports whether a complete
//! frame starts at offset zero. It never mutates or retains the buffer; the
//! caller removes `total_len` bytes once a frame is reported complete.

use super::header::{
    COUNT_FIELD_SIZE,
    FrameLayout,
    LENGTH_FIELD_SIZE,
    WORD_SIZE,
    aligned_header_len,
};
use crate::{byte_order::read_le_u32_at, codec::FramingError};

/// Default maximum segment count accepted in one frame.
pub const DEFAULT_MAX_SEGMENTS: usize = 512;

/// Default maximum frame length in bytes (64 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

/// Upper bounds applied while decoding frame headers.
///
/// Limits are checked as soon as the relevant header fields are readable,
/// so an oversized frame is rejected before its payload is buffered.
///
/// # Examples
///
/// ```
/// use segwire::frame::FrameLimits;
///
/// let limits = FrameLimits::default().max_segments(16).max_frame_length(4096);
/// assert_eq!(limits.max_segments_value(), 16);
/// assert_eq!(limits.max_frame_length_value(), 4096);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLimits {
    max_segments: usize,
    max_frame_length: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl FrameLimits {
    /// Limits that only reject frames whose size cannot be represented.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_segments: usize::MAX,
            max_frame_length: usize::MAX,
        }
    }

    /// Set the maximum segment count. Values below one are raised to one.
    #[must_use]
    pub fn max_segments(mut self, max: usize) -> Self {
        self.max_segments = max.max(1);
        self
    }

    /// Set the maximum total frame length in bytes, header included.
    ///
    /// Values below the smallest possible frame (one empty segment) are
    /// raised to it.
    #[must_use]
    pub fn max_frame_length(mut self, max: usize) -> Self {
        self.max_frame_length = max.max(WORD_SIZE);
        self
    }

    /// Configured maximum segment count.
    #[must_use]
    pub const fn max_segments_value(&self) -> usize { self.max_segments }

    /// Configured maximum frame length.
    #[must_use]
    pub const fn max_frame_length_value(&self) -> usize { self.max_frame_length }
}

/// Outcome of inspecting the front of a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// More bytes are required before the frame can be delimited.
    Incomplete {
        /// Minimum number of additional bytes needed to make progress.
        needed: usize,
    },
    /// A complete frame occupies the first `layout.total_len()` bytes.
    Complete(FrameLayout),
}

impl FrameStatus {
    /// Length of the complete frame, if one is available.
    #[must_use]
    pub fn frame_len(&self) -> Option<usize> {
        match self {
            Self::Incomplete { .. } => None,
            Self::Complete(layout) => Some(layout.total_len()),
        }
    }
}

/// Determine whether `buf` starts with a complete frame.
///
/// # Errors
///
/// Returns a [`FramingError`] when the count field overflows, the header
/// exceeds `limits`, or the declared lengths cannot be represented.
///
/// # Examples
///
/// ```
/// use segwire::frame::{FrameLimits, FrameStatus, decode};
///
/// let mut frame = vec![0, 0, 0, 0, 2, 0, 0, 0];
/// frame.extend_from_slice(&[0xaa; 16]);
///
/// let limits = FrameLimits::default();
/// let partial = decode(&frame[..23], &limits).expect("valid header");
/// assert_eq!(partial, FrameStatus::Incomplete { needed: 1 });
///
/// let full = decode(&frame, &limits).expect("valid header");
/// assert_eq!(full.frame_len(), Some(24));
/// ```
pub fn decode(buf: &[u8], limits: &FrameLimits) -> Result<FrameStatus, FramingError> {
    let Some(raw_count) = read_le_u32_at(buf, 0) else {
        return Ok(FrameStatus::Incomplete {
            needed: COUNT_FIELD_SIZE - buf.len(),
        });
    };
    if raw_count == u32::MAX {
        return Err(FramingError::SegmentCountOverflow { raw: raw_count });
    }
    let segment_count =
        usize::try_from(raw_count).map_err(|_| FramingError::LengthOverflow)? + 1;
    if segment_count > limits.max_segments {
        return Err(FramingError::TooManySegments {
            count: segment_count,
            max: limits.max_segments,
        });
    }

    let header_len = aligned_header_len(segment_count).ok_or(FramingError::LengthOverflow)?;
    if buf.len() < header_len {
        return Ok(FrameStatus::Incomplete {
            needed: header_len - buf.len(),
        });
    }

    let mut segment_words = Vec::with_capacity(segment_count);
    let mut payload_words: u64 = 0;
    for index in 0..segment_count {
        let offset = COUNT_FIELD_SIZE + index * LENGTH_FIELD_SIZE;
        let words = read_le_u32_at(buf, offset).ok_or(FramingError::LengthOverflow)?;
        payload_words = payload_words
            .checked_add(u64::from(words))
            .ok_or(FramingError::LengthOverflow)?;
        segment_words.push(words);
    }

    let total = payload_words
        .checked_mul(WORD_SIZE as u64)
        .and_then(|payload| payload.checked_add(header_len as u64))
        .ok_or(FramingError::LengthOverflow)?;
    if total > limits.max_frame_length as u64 {
        return Err(FramingError::OversizedFrame {
            size: total,
            max: limits.max_frame_length,
        });
    }

    let layout = FrameLayout::from_words(segment_words)?;
    let total_len = layout.total_len();
    if buf.len() < total_len {
        return Ok(FrameStatus::Incomplete {
            needed: total_len - buf.len(),
        });
    }
    Ok(FrameStatus::Complete(layout))
}
