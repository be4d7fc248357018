//! Event port: polling the device for remote "save now" triggers.
//!
//! The channel sends a correlated request at a fixed interval, accepts only
//! the response echoing the latest request counter, and raises an
//! edge-triggered [`EventSignal`] whenever the device's event counter moves
//! away from its baseline.

pub mod channel;
pub mod codec;
pub mod monitor;
mod signal;

pub use channel::{EventChannel, PollOutcome};
pub use codec::{
    EVENT_REQUEST_LEN,
    EVENT_RESPONSE_LEN,
    EventRequest,
    EventResponse,
    ResponseError,
};
pub use monitor::{EventMonitor, RequestCounter};
pub use signal::EventSignal;
