//! Inbound helper that turns an arbitrarily chunked byte stream into frames.
//!
//! [`Reassembler`] owns the receive buffer. Each call to
//! [`feed`](Reassembler::feed) appends a chunk and extracts every frame that
//! is now complete, in the order the bytes arrived. A frame may span many
//! chunks and a chunk may complete many frames; partial frames are never
//! emitted. The helper is transport-agnostic so the connection reader and
//! tests can drive it without sockets.

use bytes::BytesMut;

use crate::{
    codec::{EofError, FramingError, classify_eof, split_frame},
    frame::{Frame, FrameLimits},
};

/// Initial buffer capacity reserved for inbound bytes.
const INITIAL_CAPACITY: usize = 8 * 1024;

/// Stateful frame reassembler.
///
/// A framing error poisons the reassembler: the buffer is discarded and every
/// later call to [`feed`](Self::feed) returns the same error, since the
/// stream can no longer be resynchronised.
///
/// # Examples
///
/// ```
/// use segwire::reassembly::Reassembler;
///
/// let mut reassembler = Reassembler::default();
/// let frame = [0_u8, 0, 0, 0, 1, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8];
///
/// assert!(reassembler.feed(&frame[..10]).expect("valid header").is_empty());
/// let frames = reassembler.feed(&frame[10..]).expect("valid frame");
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].segment(0), Some(&frame[8..]));
/// ```
#[derive(Debug)]
pub struct Reassembler {
    buffer: BytesMut,
    limits: FrameLimits,
    failed: Option<FramingError>,
}

impl Default for Reassembler {
    fn default() -> Self { Self::new(FrameLimits::default()) }
}

impl Reassembler {
    /// Create a reassembler enforcing `limits` on every header.
    #[must_use]
    pub fn new(limits: FrameLimits) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            limits,
            failed: None,
        }
    }

    /// Append `chunk` and return every frame it completes, oldest first.
    ///
    /// Frames extracted before a malformed header in the same chunk are
    /// discarded along with the buffer; a connection treats the whole stream
    /// as unusable once framing fails.
    ///
    /// # Errors
    ///
    /// Returns the [`FramingError`] raised by the first malformed header, and
    /// the same error on every later call.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, FramingError> {
        let mut frames = Vec::new();
        self.feed_with(chunk, |frame| frames.push(frame))?;
        Ok(frames)
    }

    /// Append `chunk` and pass each completed frame to `sink` as soon as it
    /// is delimited.
    ///
    /// Frames handed to `sink` before a framing error stay delivered; this
    /// matches a reader that forwards frames downstream one at a time.
    ///
    /// # Errors
    ///
    /// Returns the [`FramingError`] raised by the first malformed header.
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut sink: F) -> Result<usize, FramingError>
    where
        F: FnMut(Frame),
    {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        self.buffer.extend_from_slice(chunk);

        let mut emitted = 0;
        loop {
            match split_frame(&mut self.buffer, &self.limits) {
                Ok(Some(frame)) => {
                    emitted += 1;
                    sink(frame);
                }
                Ok(None) => return Ok(emitted),
                Err(err) => {
                    tracing::warn!(error = %err, buffered = self.buffer.len(), "malformed frame header");
                    self.buffer = BytesMut::new();
                    self.failed = Some(err.clone());
                    return Err(err);
                }
            }
        }
    }

    /// Classify the buffered bytes at end of stream and clear the buffer.
    ///
    /// Returns [`EofError::CleanClose`] when the stream ended on a frame
    /// boundary.
    pub fn finish(&mut self) -> EofError {
        let outcome = classify_eof(&self.buffer, &self.limits);
        self.buffer.clear();
        outcome
    }

    /// Discard any buffered bytes without classifying them.
    pub fn clear(&mut self) { self.buffer.clear(); }

    /// Number of bytes buffered towards the next frame.
    #[must_use]
    pub fn buffered(&self) -> usize { self.buffer.len() }

    /// The framing error that poisoned this reassembler, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&FramingError> { self.failed.as_ref() }

    /// Limits applied to each header.
    #[must_use]
    pub const fn limits(&self) -> &FrameLimits { &self.limits }
}
