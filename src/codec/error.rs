//! Error types for the segment framing layer.
//!
//! Segment framing has no way to skip a bad frame: the header is the only
//! thing that says where the next frame begins. Every [`FramingError`] is
//! therefore fatal for the stream that produced it.
//!
//! # Error Categories
//!
//! - [`FramingError`]: the header is malformed or exceeds the configured limits.
//! - [`EofError`]: how the stream ended relative to the frame boundaries, separating a clean
//!   close from a truncated frame.

use std::io;

use thiserror::Error;

/// Malformed-frame errors raised while reading a frame header.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// The segment count field holds `u32::MAX`, so `count + 1` overflows.
    #[error("segment count field {raw:#x} overflows")]
    SegmentCountOverflow {
        /// Raw value of the count field.
        raw: u32,
    },

    /// The header declares more segments than the configured limit.
    #[error("frame declares {count} segments, limit is {max}")]
    TooManySegments {
        /// Declared segment count.
        count: usize,
        /// Maximum accepted segment count.
        max: usize,
    },

    /// The header declares a frame larger than the configured limit.
    #[error("frame exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Total frame size implied by the header.
        size: u64,
        /// Maximum accepted frame size.
        max: usize,
    },

    /// The declared segment lengths do not fit the address space.
    #[error("declared segment lengths overflow")]
    LengthOverflow,
}

/// EOF handling variants distinguishing a clean close from a truncated frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// The stream ended exactly on a frame boundary.
    #[error("connection closed cleanly at frame boundary")]
    CleanClose,

    /// The stream ended before the frame header was complete.
    #[error("premature EOF during header: {bytes_received} of {header_size} header bytes")]
    MidHeader {
        /// Header bytes received before EOF.
        bytes_received: usize,
        /// Aligned header size, or the count field width when unknown.
        header_size: usize,
    },

    /// The stream ended after the header but before the last segment byte.
    #[error("premature EOF: {bytes_received} bytes of {expected} byte frame received")]
    MidFrame {
        /// Bytes received before EOF.
        bytes_received: usize,
        /// Total frame size declared by the header.
        expected: usize,
    },
}

impl EofError {
    /// Returns `true` when no frame data was lost.
    ///
    /// # Examples
    ///
    /// ```
    /// use segwire::codec::EofError;
    ///
    /// assert!(EofError::CleanClose.is_clean());
    /// assert!(
    ///     !EofError::MidFrame {
    ///         bytes_received: 8,
    ///         expected: 24
    ///     }
    ///     .is_clean()
    /// );
    /// ```
    #[must_use]
    pub const fn is_clean(&self) -> bool { matches!(self, Self::CleanClose) }
}

impl From<FramingError> for io::Error {
    fn from(err: FramingError) -> Self { io::Error::new(io::ErrorKind::InvalidData, err) }
}

impl From<EofError> for io::Error {
    fn from(err: EofError) -> Self { io::Error::new(io::ErrorKind::UnexpectedEof, err) }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
