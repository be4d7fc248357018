//! Metric helpers for `scopeview`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking datagrams read from the control socket.
pub const FRAGMENTS_RECEIVED: &str = "scopeview_fragments_received_total";
/// Name of the counter tracking datagrams rejected before re-assembly.
pub const DATAGRAMS_REJECTED: &str = "scopeview_datagrams_rejected_total";
/// Name of the counter tracking frame outcomes.
pub const FRAMES_TOTAL: &str = "scopeview_frames_total";
/// Name of the counter tracking remote save events.
pub const REMOTE_EVENTS: &str = "scopeview_remote_events_total";

/// Final state of a frame the re-assembler stopped tracking.
#[derive(Clone, Copy, Debug)]
pub enum FrameOutcome {
    /// The frame was emitted to the sink.
    Decoded,
    /// The frame was abandoned.
    Dropped,
}

impl FrameOutcome {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only labels metrics"))]
    fn as_str(self) -> &'static str {
        match self {
            FrameOutcome::Decoded => "decoded",
            FrameOutcome::Dropped => "dropped",
        }
    }
}

/// Record a datagram read from the control socket.
pub fn inc_fragments() {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_RECEIVED).increment(1);
}

/// Record a malformed datagram.
pub fn inc_rejected() {
    #[cfg(feature = "metrics")]
    counter!(DATAGRAMS_REJECTED).increment(1);
}

/// Record the outcome of a frame.
pub fn inc_frames(outcome: FrameOutcome) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a remote save event raised by the event channel.
pub fn inc_remote_events() {
    #[cfg(feature = "metrics")]
    counter!(REMOTE_EVENTS).increment(1);
}
