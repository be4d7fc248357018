//! Helpers for the device's little-endian wire integers.
//!
//! The capture device encodes every multi-byte field little-endian. These
//! helpers keep Clippy expectations scoped to the conversion points and pull
//! fixed-width fields out of a datagram by offset without panicking.

/// Serialise a `u16` in device byte order (little-endian).
///
/// # Examples
///
/// ```
/// use scopeview::byte_order::write_le_u16;
///
/// assert_eq!(write_le_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_le_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The device protocol is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a device-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use scopeview::byte_order::read_le_u16;
///
/// assert_eq!(read_le_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub fn read_le_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The device protocol is little-endian."
    )]
    u16::from_le_bytes(bytes)
}

/// Serialise a `u32` in device byte order (little-endian).
///
/// # Examples
///
/// ```
/// use scopeview::byte_order::write_le_u32;
///
/// assert_eq!(write_le_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_le_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The device protocol is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a device-order `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use scopeview::byte_order::read_le_u32;
///
/// assert_eq!(read_le_u32([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_le_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The device protocol is little-endian."
    )]
    u32::from_le_bytes(bytes)
}

/// Copy `N` bytes starting at `offset`, or `None` when `buf` is too short.
#[must_use]
pub fn array_at<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    buf.get(offset..end)?.try_into().ok()
}

/// Read a little-endian `u16` at `offset`.
#[must_use]
pub fn le_u16_at(buf: &[u8], offset: usize) -> Option<u16> { array_at(buf, offset).map(read_le_u16) }

/// Read a little-endian `u32` at `offset`.
#[must_use]
pub fn le_u32_at(buf: &[u8], offset: usize) -> Option<u32> { array_at(buf, offset).map(read_le_u32) }
