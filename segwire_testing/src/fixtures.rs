//! Raw wire-byte fixtures.
//!
//! Headers are written by hand rather than through the crate's encoder so a
//! fixture can describe any header, including ones the builder refuses.

/// One segment of two words: the smallest frame with a non-empty payload
/// that still needs a padded header. 24 bytes in total.
pub const REFERENCE_FRAME: [u8; 24] = [
    0, 0, 0, 0, // segment count - 1
    2, 0, 0, 0, // segment 0: two words
    1, 2, 3, 4, 5, 6, 7, 8, //
    9, 10, 11, 12, 13, 14, 15, 16,
];

/// Encode a header for segments of `words` words each, padded to eight
/// bytes.
///
/// An empty slice produces a count field of `u32::MAX`, the value the
/// decoder must reject.
#[must_use]
pub fn header_bytes(words: &[u32]) -> Vec<u8> {
    let count = u32::try_from(words.len()).unwrap_or(u32::MAX);
    let mut header = count.wrapping_sub(1).to_le_bytes().to_vec();
    for word in words {
        header.extend_from_slice(&word.to_le_bytes());
    }
    while header.len() % 8 != 0 {
        header.push(0);
    }
    header
}

/// A complete frame whose segment `i` holds `words[i]` words filled with
/// the byte `i + 1`.
#[must_use]
pub fn word_frame(words: &[u32]) -> Vec<u8> {
    let mut wire = header_bytes(words);
    for (index, &count) in words.iter().enumerate() {
        let fill = u8::try_from(index + 1).unwrap_or(u8::MAX);
        let len = usize::try_from(count).unwrap_or(usize::MAX) * 8;
        wire.resize(wire.len() + len, fill);
    }
    wire
}

/// A complete frame carrying `payloads`, each zero-padded to a whole word.
#[must_use]
pub fn segment_frame(payloads: &[&[u8]]) -> Vec<u8> {
    let words: Vec<u32> = payloads
        .iter()
        .map(|payload| u32::try_from(payload.len().div_ceil(8)).unwrap_or(u32::MAX))
        .collect();
    let mut wire = header_bytes(&words);
    for payload in payloads {
        wire.extend_from_slice(payload);
        let padding = payload.len().next_multiple_of(8) - payload.len();
        wire.resize(wire.len() + padding, 0);
    }
    wire
}
