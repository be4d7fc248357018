//! Rejection and drop reasons emitted by the fragment layer.
//!
//! Neither enum is ever fatal. [`DatagramError`] explains why a datagram never
//! reached the re-assembler; [`DropReason`] explains why an in-progress frame
//! was abandoned. Both exist so callers can log precise diagnostics before
//! moving on.

use thiserror::Error;

use super::FragmentIndex;

/// Reasons a control-port datagram is discarded before re-assembly.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DatagramError {
    /// The datagram cannot hold a full fragment header.
    #[error("datagram too short: {len} bytes")]
    TooShort { len: usize },
    /// Byte 0 does not carry the video magic.
    #[error("bad magic byte {found:#04x}")]
    BadMagic { found: u8 },
    /// Byte 2 does not carry the protocol marker.
    #[error("bad protocol marker {found:#04x}")]
    BadMarker { found: u8 },
    /// The header's fragment length disagrees with the bytes that followed it.
    #[error("payload length mismatch: declared {declared}, actual {actual}")]
    PayloadLength { declared: u16, actual: usize },
    /// A payload cannot be described by the 16-bit length field.
    #[error("payload of {len} bytes exceeds the fragment length field")]
    PayloadTooLarge { len: usize },
}

/// Reasons the re-assembler abandons the frame it was building.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DropReason {
    /// The frame stayed incomplete for longer than the frame timeout.
    #[error("frame timed out")]
    Timeout,
    /// A fragment skipped ahead of, or repeated, the expected index.
    #[error("fragment out of order: expected {expected}, found {found}")]
    OutOfOrder {
        expected: FragmentIndex,
        found: FragmentIndex,
    },
    /// The end fragment arrived with a different byte count than declared.
    #[error("frame size mismatch: declared {declared} bytes, assembled {assembled}")]
    SizeMismatch { declared: u32, assembled: usize },
    /// A fragment followed the one carrying index `u16::MAX`.
    #[error("fragment {found} arrived after the last representable index")]
    IndexExhausted { found: FragmentIndex },
}
