//! Wire format of the event port request/response exchange.
//!
//! ```text
//! request  (18 bytes): "SETCMD" | counter u16 LE | 00 00 90 00 04 00 00 00 00 00
//! response (20 bytes): "RETCMD" | counter u16 LE | 00 00 90 00 04 00 | 4 reserved | event u16 LE
//! ```

use thiserror::Error;

use crate::byte_order::{le_u16_at, write_le_u16};

/// Length of an event request datagram.
pub const EVENT_REQUEST_LEN: usize = 18;
/// Length of an event response datagram.
pub const EVENT_RESPONSE_LEN: usize = 20;
/// ASCII prefix opening every request.
pub const EVENT_REQUEST_PREFIX: &[u8; 6] = b"SETCMD";
/// Fixed bytes closing every request.
pub const EVENT_REQUEST_TAIL: [u8; 10] = [0x00, 0x00, 0x90, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];
/// ASCII prefix opening every response.
pub const EVENT_RESPONSE_PREFIX: &[u8; 6] = b"RETCMD";
/// Fixed bytes following the echoed counter in a response.
pub const EVENT_RESPONSE_MIDDLE: [u8; 6] = [0x00, 0x00, 0x90, 0x00, 0x04, 0x00];

const COUNTER_OFFSET: usize = 6;
const MIDDLE_OFFSET: usize = 8;
const SERVER_COUNTER_OFFSET: usize = 18;

/// Reasons an event response is ignored.
///
/// None of these are failures: stale and foreign datagrams are expected on
/// an unreliable transport.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// The datagram is not exactly [`EVENT_RESPONSE_LEN`] bytes.
    #[error("response length {len}, expected {EVENT_RESPONSE_LEN}")]
    Length { len: usize },
    /// The datagram does not start with [`EVENT_RESPONSE_PREFIX`].
    #[error("response prefix mismatch")]
    Prefix,
    /// The response answers a request other than the latest one.
    #[error("stale response: expected counter {expected}, found {found}")]
    CounterMismatch { expected: u16, found: u16 },
    /// The fixed middle bytes are missing.
    #[error("response middle bytes mismatch")]
    Middle,
}

/// Outbound poll carrying a wrapping request counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRequest {
    counter: u16,
}

impl EventRequest {
    /// Create a request tagged with `counter`.
    #[must_use]
    pub const fn new(counter: u16) -> Self { Self { counter } }

    /// Counter the device must echo back.
    #[must_use]
    pub const fn counter(&self) -> u16 { self.counter }

    /// Encode the request datagram.
    ///
    /// # Examples
    ///
    /// ```
    /// use scopeview::event::EventRequest;
    ///
    /// let bytes = EventRequest::new(0x0102).encode();
    /// assert_eq!(&bytes[..6], b"SETCMD");
    /// assert_eq!(&bytes[6..8], &[0x02, 0x01]);
    /// ```
    #[must_use]
    pub fn encode(&self) -> [u8; EVENT_REQUEST_LEN] {
        let mut buf = [0_u8; EVENT_REQUEST_LEN];
        buf[..COUNTER_OFFSET].copy_from_slice(EVENT_REQUEST_PREFIX);
        buf[COUNTER_OFFSET..MIDDLE_OFFSET].copy_from_slice(&write_le_u16(self.counter));
        buf[MIDDLE_OFFSET..].copy_from_slice(&EVENT_REQUEST_TAIL);
        buf
    }
}

/// Validated response to the latest [`EventRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventResponse {
    request_counter: u16,
    server_counter: u16,
}

impl EventResponse {
    /// Create a response as the device would send it.
    #[must_use]
    pub const fn new(request_counter: u16, server_counter: u16) -> Self {
        Self {
            request_counter,
            server_counter,
        }
    }

    /// Validate `datagram` as the answer to the request tagged `expected`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseError`] naming the first check that failed. The
    /// caller is expected to ignore the datagram.
    pub fn parse(datagram: &[u8], expected: u16) -> Result<Self, ResponseError> {
        if datagram.len() != EVENT_RESPONSE_LEN {
            return Err(ResponseError::Length {
                len: datagram.len(),
            });
        }
        if !datagram.starts_with(EVENT_RESPONSE_PREFIX) {
            return Err(ResponseError::Prefix);
        }
        let found = le_u16_at(datagram, COUNTER_OFFSET).ok_or(ResponseError::Length {
            len: datagram.len(),
        })?;
        if found != expected {
            return Err(ResponseError::CounterMismatch { expected, found });
        }
        if datagram.get(MIDDLE_OFFSET..MIDDLE_OFFSET + EVENT_RESPONSE_MIDDLE.len())
            != Some(EVENT_RESPONSE_MIDDLE.as_slice())
        {
            return Err(ResponseError::Middle);
        }
        let server_counter = le_u16_at(datagram, SERVER_COUNTER_OFFSET).ok_or(ResponseError::Length {
            len: datagram.len(),
        })?;
        Ok(Self::new(found, server_counter))
    }

    /// Encode the response datagram with zeroed reserved bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; EVENT_RESPONSE_LEN] {
        let mut buf = [0_u8; EVENT_RESPONSE_LEN];
        buf[..COUNTER_OFFSET].copy_from_slice(EVENT_RESPONSE_PREFIX);
        buf[COUNTER_OFFSET..MIDDLE_OFFSET].copy_from_slice(&write_le_u16(self.request_counter));
        buf[MIDDLE_OFFSET..MIDDLE_OFFSET + EVENT_RESPONSE_MIDDLE.len()]
            .copy_from_slice(&EVENT_RESPONSE_MIDDLE);
        buf[SERVER_COUNTER_OFFSET..].copy_from_slice(&write_le_u16(self.server_counter));
        buf
    }

    /// Request counter echoed by the device.
    #[must_use]
    pub const fn request_counter(&self) -> u16 { self.request_counter }

    /// Device-side event counter; a change signals a save request.
    #[must_use]
    pub const fn server_counter(&self) -> u16 { self.server_counter }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{EVENT_REQUEST_LEN, EventRequest, EventResponse, ResponseError};

    #[test]
    fn request_layout() {
        let bytes = EventRequest::new(0xbeef).encode();
        assert_eq!(bytes.len(), EVENT_REQUEST_LEN);
        assert_eq!(
            bytes,
            [
                b'S', b'E', b'T', b'C', b'M', b'D', 0xef, 0xbe, 0x00, 0x00, 0x90, 0x00, 0x04, 0x00,
                0x00, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn parses_device_response() {
        let bytes: [u8; 20] = [
            b'R', b'E', b'T', b'C', b'M', b'D', 0x07, 0x00, 0x00, 0x00, 0x90, 0x00, 0x04, 0x00,
            0xaa, 0xbb, 0xcc, 0xdd, 0x65, 0x00,
        ];
        let response = EventResponse::parse(&bytes, 7).expect("valid response");
        assert_eq!(response.request_counter(), 7);
        assert_eq!(response.server_counter(), 101);
    }

    #[test]
    fn stale_counter_is_rejected() {
        let bytes = EventResponse::new(6, 100).encode();
        assert_eq!(
            EventResponse::parse(&bytes, 7),
            Err(ResponseError::CounterMismatch {
                expected: 7,
                found: 6,
            })
        );
    }

    #[rstest]
    #[case::short(19)]
    #[case::long(21)]
    fn wrong_length_is_rejected(#[case] len: usize) {
        let mut bytes = EventResponse::new(1, 1).encode().to_vec();
        bytes.resize(len, 0);
        assert_eq!(
            EventResponse::parse(&bytes, 1),
            Err(ResponseError::Length { len })
        );
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        let mut bytes = EventResponse::new(1, 1).encode();
        bytes[..6].copy_from_slice(b"SETCMD");
        assert_eq!(EventResponse::parse(&bytes, 1), Err(ResponseError::Prefix));
    }

    #[test]
    fn wrong_middle_is_rejected() {
        let mut bytes = EventResponse::new(1, 1).encode();
        bytes[10] = 0x91;
        assert_eq!(EventResponse::parse(&bytes, 1), Err(ResponseError::Middle));
    }
}
