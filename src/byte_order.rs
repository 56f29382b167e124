//! Helpers for explicit little-endian conversions.
//!
//! Segment framing stores every header word little-endian. Keeping the
//! conversions here lets the frame code state the wire endianness once
//! instead of sprinkling `to_le_bytes` calls through the parser.

/// Width of a header word in bytes.
pub const HEADER_WORD_SIZE: usize = 4;

/// Serialise a `u32` header word in little-endian order.
///
/// # Examples
///
/// ```
/// use segwire::byte_order::write_le_u32;
///
/// assert_eq!(write_le_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_le_u32(value: u32) -> [u8; HEADER_WORD_SIZE] { value.to_le_bytes() }

/// Parse a little-endian `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use segwire::byte_order::read_le_u32;
///
/// assert_eq!(read_le_u32([0x02, 0x00, 0x00, 0x00]), 2);
/// ```
#[must_use]
pub fn read_le_u32(bytes: [u8; HEADER_WORD_SIZE]) -> u32 { u32::from_le_bytes(bytes) }

/// Read the header word starting at `offset`, if the buffer holds it.
///
/// Returns `None` when fewer than four bytes remain after `offset`.
///
/// # Examples
///
/// ```
/// use segwire::byte_order::read_le_u32_at;
///
/// let buf = [0xff, 0x01, 0x00, 0x00, 0x00];
/// assert_eq!(read_le_u32_at(&buf, 1), Some(1));
/// assert_eq!(read_le_u32_at(&buf, 2), None);
/// ```
#[must_use]
pub fn read_le_u32_at(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(HEADER_WORD_SIZE)?;
    let word: [u8; HEADER_WORD_SIZE] = buf.get(offset..end)?.try_into().ok()?;
    Some(read_le_u32(word))
}
