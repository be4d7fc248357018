//! Parsing and encoding of the 24-byte video fragment header.
//!
//! ```text
//! 0       1      2        3         4..8        8..12   12..14   14..16    16..24
//! magic | flag | marker | frame id | total size | -     | index  | payload | reserved
//!                                    u32 LE              u16 LE   u16 LE
//! ```

use super::{DatagramError, FragmentIndex, FrameId};
use crate::byte_order::{le_u16_at, le_u32_at, write_le_u16, write_le_u32};

/// Length of the fixed header that precedes every fragment payload.
pub const FRAGMENT_HEADER_LEN: usize = 24;
/// Byte 0 of every video datagram.
pub const FRAGMENT_MAGIC: u8 = 0x66;
/// Byte 2 of every video datagram.
pub const FRAGMENT_MARKER: u8 = 0x01;

const FLAG_OFFSET: usize = 1;
const MARKER_OFFSET: usize = 2;
const FRAME_ID_OFFSET: usize = 3;
const FRAME_SIZE_OFFSET: usize = 4;
const INDEX_OFFSET: usize = 12;
const PAYLOAD_LEN_OFFSET: usize = 14;

/// Position of a fragment within its frame, taken from header byte 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFlag {
    /// Any fragment that neither opens nor closes a frame.
    Continuation,
    /// The first fragment of a frame (`0x01`).
    Start,
    /// The last fragment of a frame (`0x02`).
    End,
    /// A frame carried by one fragment (`0x03`).
    Single,
}

impl FrameFlag {
    /// Decode the flag byte. Unknown values are continuations.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => Self::Start,
            0x02 => Self::End,
            0x03 => Self::Single,
            _ => Self::Continuation,
        }
    }

    /// Encode the flag byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Continuation => 0x00,
            Self::Start => 0x01,
            Self::End => 0x02,
            Self::Single => 0x03,
        }
    }

    /// Whether this fragment opens a new frame.
    #[must_use]
    pub const fn is_start(self) -> bool { matches!(self, Self::Start | Self::Single) }

    /// Whether this fragment closes the current frame.
    #[must_use]
    pub const fn is_end(self) -> bool { matches!(self, Self::End | Self::Single) }
}

/// Header fields describing a single fragment.
///
/// # Examples
///
/// ```
/// use scopeview::fragment::{FragmentHeader, FragmentIndex, FrameFlag, FrameId};
/// let header = FragmentHeader::new(FrameFlag::Start, FrameId::new(5), 6, FragmentIndex::zero(), 2);
/// let bytes = header.encode();
/// assert_eq!(bytes[0], 0x66);
/// assert_eq!(bytes[1], 0x01);
/// assert_eq!(bytes[3], 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentHeader {
    flag: FrameFlag,
    frame_id: FrameId,
    frame_size: u32,
    index: FragmentIndex,
    payload_len: u16,
}

impl FragmentHeader {
    /// Create a new fragment header.
    #[must_use]
    pub const fn new(
        flag: FrameFlag,
        frame_id: FrameId,
        frame_size: u32,
        index: FragmentIndex,
        payload_len: u16,
    ) -> Self {
        Self {
            flag,
            frame_id,
            frame_size,
            index,
            payload_len,
        }
    }

    /// Parse the fixed header at the front of `datagram`.
    ///
    /// # Errors
    ///
    /// Returns [`DatagramError::TooShort`] when fewer than
    /// [`FRAGMENT_HEADER_LEN`] bytes are present, or [`DatagramError::BadMagic`]
    /// / [`DatagramError::BadMarker`] when the marker bytes are wrong.
    pub fn parse(datagram: &[u8]) -> Result<Self, DatagramError> {
        let too_short = DatagramError::TooShort {
            len: datagram.len(),
        };
        let Some(header) = datagram.get(..FRAGMENT_HEADER_LEN) else {
            return Err(too_short);
        };

        let magic = header[0];
        if magic != FRAGMENT_MAGIC {
            return Err(DatagramError::BadMagic { found: magic });
        }
        let marker = header[MARKER_OFFSET];
        if marker != FRAGMENT_MARKER {
            return Err(DatagramError::BadMarker { found: marker });
        }

        let (Some(frame_size), Some(index), Some(payload_len)) = (
            le_u32_at(header, FRAME_SIZE_OFFSET),
            le_u16_at(header, INDEX_OFFSET),
            le_u16_at(header, PAYLOAD_LEN_OFFSET),
        ) else {
            return Err(too_short);
        };

        Ok(Self {
            flag: FrameFlag::from_byte(header[FLAG_OFFSET]),
            frame_id: FrameId::new(header[FRAME_ID_OFFSET]),
            frame_size,
            index: FragmentIndex::new(index),
            payload_len,
        })
    }

    /// Encode the header into its 24-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; FRAGMENT_HEADER_LEN] {
        let mut buf = [0_u8; FRAGMENT_HEADER_LEN];
        buf[0] = FRAGMENT_MAGIC;
        buf[FLAG_OFFSET] = self.flag.to_byte();
        buf[MARKER_OFFSET] = FRAGMENT_MARKER;
        buf[FRAME_ID_OFFSET] = self.frame_id.get();
        buf[FRAME_SIZE_OFFSET..FRAME_SIZE_OFFSET + 4].copy_from_slice(&write_le_u32(self.frame_size));
        buf[INDEX_OFFSET..INDEX_OFFSET + 2].copy_from_slice(&write_le_u16(self.index.get()));
        buf[PAYLOAD_LEN_OFFSET..PAYLOAD_LEN_OFFSET + 2]
            .copy_from_slice(&write_le_u16(self.payload_len));
        buf
    }

    /// Position of the fragment within its frame.
    #[must_use]
    pub const fn flag(&self) -> FrameFlag { self.flag }

    /// Identifier of the frame this fragment claims to belong to.
    #[must_use]
    pub const fn frame_id(&self) -> FrameId { self.frame_id }

    /// Total frame size declared by the device, in bytes.
    #[must_use]
    pub const fn frame_size(&self) -> u32 { self.frame_size }

    /// Fragment position within the frame.
    #[must_use]
    pub const fn index(&self) -> FragmentIndex { self.index }

    /// Declared length of the payload following the header.
    #[must_use]
    pub const fn payload_len(&self) -> u16 { self.payload_len }
}

/// A validated fragment borrowing its payload from the receive buffer.
///
/// Construction guarantees the payload length matches the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment<'a> {
    header: FragmentHeader,
    payload: &'a [u8],
}

impl<'a> Fragment<'a> {
    /// Build a fragment, deriving the header's payload length from `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`DatagramError::PayloadTooLarge`] when `payload` does not fit
    /// the 16-bit length field.
    pub fn new(
        flag: FrameFlag,
        frame_id: FrameId,
        frame_size: u32,
        index: FragmentIndex,
        payload: &'a [u8],
    ) -> Result<Self, DatagramError> {
        let payload_len = u16::try_from(payload.len())
            .map_err(|_| DatagramError::PayloadTooLarge { len: payload.len() })?;
        Ok(Self {
            header: FragmentHeader::new(flag, frame_id, frame_size, index, payload_len),
            payload,
        })
    }

    /// Parse and validate a whole control-port datagram.
    ///
    /// # Errors
    ///
    /// Returns any header error from [`FragmentHeader::parse`], or
    /// [`DatagramError::PayloadLength`] when the bytes after the header do not
    /// match the declared fragment length.
    pub fn parse(datagram: &'a [u8]) -> Result<Self, DatagramError> {
        let header = FragmentHeader::parse(datagram)?;
        let payload = datagram.get(FRAGMENT_HEADER_LEN..).unwrap_or_default();
        if payload.len() != usize::from(header.payload_len()) {
            return Err(DatagramError::PayloadLength {
                declared: header.payload_len(),
                actual: payload.len(),
            });
        }
        Ok(Self { header, payload })
    }

    /// Encode the fragment as a complete datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAGMENT_HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(self.payload);
        buf
    }

    /// Parsed header fields.
    #[must_use]
    pub const fn header(&self) -> &FragmentHeader { &self.header }

    /// Payload bytes carried by this fragment.
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] { self.payload }
}
