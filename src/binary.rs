//! Binary reading utilities for parsing SLP event payloads.
//!
//! This module provides functions for reading big-endian integers, floats,
//! and booleans from byte buffers. All functions perform bounds checking and
//! return `None` for reads that extend past the end of the buffer.
//!
//! # Absent, not an error
//!
//! The SLP protocol is versioned by *appending* fields to event payloads.
//! A replay recorded by an older version simply has a shorter payload, and
//! every field that would sit past the end of it is "not present" rather
//! than malformed. Returning `Option` here lets every decoded field carry
//! that distinction without a single offset check at the call sites.
//!
//! # Endianness
//!
//! The SLP event stream stores all multi-byte values in big-endian byte
//! order (it is produced by a PowerPC game console).
//!
//! # Example
//!
//! ```
//! use slp_parser::binary::{read_u16, read_u32};
//!
//! let data = [0x12, 0x34, 0x56, 0x78];
//!
//! assert_eq!(read_u16(&data, 0), Some(0x1234));
//! assert_eq!(read_u32(&data, 0), Some(0x12345678));
//! // Past the end: absent, not an error
//! assert_eq!(read_u32(&data, 2), None);
//! ```

/// Reads a big-endian u8 value at the given offset.
#[must_use]
pub fn read_u8(bytes: &[u8], offset: usize) -> Option<u8> {
    bytes.get(offset).copied()
}

/// Reads a big-endian i8 value at the given offset.
#[must_use]
pub fn read_i8(bytes: &[u8], offset: usize) -> Option<i8> {
    bytes.get(offset).map(|&b| b as i8)
}

/// Reads a big-endian u16 value at the given offset.
#[must_use]
pub fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let slice = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([slice[0], slice[1]]))
}

/// Reads a big-endian u32 value at the given offset.
#[must_use]
pub fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Reads a big-endian i32 value at the given offset.
#[must_use]
pub fn read_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    let slice = bytes.get(offset..offset.checked_add(4)?)?;
    Some(i32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Reads a big-endian f32 value at the given offset.
#[must_use]
pub fn read_f32(bytes: &[u8], offset: usize) -> Option<f32> {
    let slice = bytes.get(offset..offset.checked_add(4)?)?;
    Some(f32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Reads a boolean (any nonzero byte is `true`) at the given offset.
#[must_use]
pub fn read_bool(bytes: &[u8], offset: usize) -> Option<bool> {
    bytes.get(offset).map(|&b| b != 0)
}

/// Reads a fixed-width byte window at the given offset.
///
/// Returns as many bytes as are available if the window extends past the end
/// of the buffer, and an empty slice if the offset itself is out of bounds.
/// Text fields in `GameStart` payloads are fixed-width windows that may be
/// cut short by an older protocol version, so short windows are usable data
/// here rather than an error.
#[must_use]
pub fn read_window(bytes: &[u8], offset: usize, len: usize) -> &[u8] {
    if offset >= bytes.len() {
        return &[];
    }
    let end = std::cmp::min(offset.saturating_add(len), bytes.len());
    &bytes[offset..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u8() {
        let data = [0xAB, 0xCD];
        assert_eq!(read_u8(&data, 0), Some(0xAB));
        assert_eq!(read_u8(&data, 1), Some(0xCD));
        assert_eq!(read_u8(&data, 2), None);
    }

    #[test]
    fn test_read_i8() {
        let data = [0xFF, 0x7F];
        assert_eq!(read_i8(&data, 0), Some(-1));
        assert_eq!(read_i8(&data, 1), Some(127));
        assert_eq!(read_i8(&data, 2), None);
    }

    #[test]
    fn test_read_u16_big_endian() {
        let data = [0x12, 0x34, 0xFF, 0xFF];
        assert_eq!(read_u16(&data, 0), Some(0x1234));
        assert_eq!(read_u16(&data, 2), Some(0xFFFF));
    }

    #[test]
    fn test_read_u16_overflow() {
        let data = [0x12, 0x34];
        assert_eq!(read_u16(&data, 1), None);
        assert_eq!(read_u16(&data, 10), None);
    }

    #[test]
    fn test_read_u32_big_endian() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(read_u32(&data, 0), Some(0x12345678));
    }

    #[test]
    fn test_read_i32_negative() {
        // Frame numbers start at -123 during the pre-match countdown
        let data = (-123i32).to_be_bytes();
        assert_eq!(read_i32(&data, 0), Some(-123));
    }

    #[test]
    fn test_read_f32() {
        let data = 42.5f32.to_be_bytes();
        assert_eq!(read_f32(&data, 0), Some(42.5));
        assert_eq!(read_f32(&data, 1), None);
    }

    #[test]
    fn test_read_bool() {
        let data = [0x00, 0x01, 0x7F];
        assert_eq!(read_bool(&data, 0), Some(false));
        assert_eq!(read_bool(&data, 1), Some(true));
        assert_eq!(read_bool(&data, 2), Some(true));
        assert_eq!(read_bool(&data, 3), None);
    }

    #[test]
    fn test_read_window_full() {
        let data = [1, 2, 3, 4, 5];
        assert_eq!(read_window(&data, 1, 3), &[2, 3, 4]);
    }

    #[test]
    fn test_read_window_short() {
        let data = [1, 2, 3];
        assert_eq!(read_window(&data, 2, 10), &[3]);
    }

    #[test]
    fn test_read_window_out_of_bounds() {
        let data = [1, 2, 3];
        assert_eq!(read_window(&data, 3, 4), &[] as &[u8]);
        assert_eq!(read_window(&data, 100, 4), &[] as &[u8]);
    }

    #[test]
    fn test_empty_buffer() {
        let data: [u8; 0] = [];
        assert_eq!(read_u8(&data, 0), None);
        assert_eq!(read_u32(&data, 0), None);
        assert_eq!(read_f32(&data, 0), None);
    }
}
