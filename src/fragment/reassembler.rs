//! Inbound helper that stitches video fragments back into complete frames.
//!
//! [`Reassembler`] tracks exactly one in-flight frame. Fragments must arrive
//! strictly in index order: any gap or repeat abandons the partial frame
//! instead of buffering for later reordering. A start fragment always opens a
//! fresh frame, silently replacing whatever was in progress. Continuation and
//! end fragments are not checked against the frame id that opened the frame;
//! only ordering and the declared size gate acceptance, which tolerates
//! devices that renumber mid-frame.
//!
//! Abandoned frames are counted in the shared [`Statistics`]; they are never
//! surfaced as errors.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use super::{DropReason, Fragment, FragmentIndex, FrameId};
use crate::stats::Statistics;

#[derive(Debug)]
struct PartialFrame {
    frame_id: FrameId,
    declared_size: u32,
    buffer: BytesMut,
    /// `None` once index `u16::MAX` was accepted; any further fragment is
    /// then out of order.
    next_index: Option<FragmentIndex>,
    started_at: Instant,
}

impl PartialFrame {
    fn new(frame_id: FrameId, declared_size: u32, started_at: Instant) -> Self {
        Self {
            frame_id,
            declared_size,
            buffer: BytesMut::new(),
            next_index: Some(FragmentIndex::zero()),
            started_at,
        }
    }

    fn expired_at(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.started_at) > timeout
    }
}

/// A fully re-assembled frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    frame_id: FrameId,
    payload: Bytes,
}

impl Frame {
    /// Construct a new [`Frame`].
    #[must_use]
    pub fn new(frame_id: FrameId, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_id,
            payload: payload.into(),
        }
    }

    /// Identifier carried by the fragment that opened this frame.
    #[must_use]
    pub const fn frame_id(&self) -> FrameId { self.frame_id }

    /// Borrow the frame bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Consume the frame, returning the owned bytes.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Length of the frame in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.payload.len() }

    /// Whether the frame carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.payload.is_empty() }
}

/// Single-frame re-assembler with timeout-based eviction.
#[derive(Debug)]
pub struct Reassembler {
    timeout: Duration,
    partial: Option<PartialFrame>,
    stats: Arc<Statistics>,
}

impl Reassembler {
    /// Create an idle re-assembler that abandons frames older than `timeout`.
    #[must_use]
    pub fn new(timeout: Duration, stats: Arc<Statistics>) -> Self {
        Self {
            timeout,
            partial: None,
            stats,
        }
    }

    /// Process a fragment using the current time.
    ///
    /// Returns the completed frame when `fragment` finishes one.
    pub fn push(&mut self, fragment: &Fragment<'_>) -> Option<Frame> {
        self.push_at(fragment, Instant::now())
    }

    /// Process a fragment using an explicit clock reading.
    ///
    /// The steps run in a fixed order: expire a stale frame, open a new frame
    /// on a start flag, enforce the expected index, append, then check for
    /// completion on an end flag. A timeout drop is charged to the expired
    /// frame; `fragment` is still evaluated against the reset state.
    pub fn push_at(&mut self, fragment: &Fragment<'_>, now: Instant) -> Option<Frame> {
        self.expire_at(now);

        let header = fragment.header();
        if header.flag().is_start() {
            if let Some(previous) = self.partial.take() {
                debug!(
                    frame_id = %previous.frame_id,
                    buffered = previous.buffer.len(),
                    "start fragment replaced an incomplete frame"
                );
            }
            self.partial = Some(PartialFrame::new(
                header.frame_id(),
                header.frame_size(),
                now,
            ));
        }

        let Some(partial) = self.partial.as_mut() else {
            trace!(
                frame_id = %header.frame_id(),
                index = %header.index(),
                "fragment outside any frame discarded"
            );
            return None;
        };

        let found = header.index();
        let next = partial.next_index;
        match next {
            Some(expected) if expected == found => {}
            Some(expected) => {
                self.drop_frame(DropReason::OutOfOrder { expected, found });
                return None;
            }
            None => {
                self.drop_frame(DropReason::IndexExhausted { found });
                return None;
            }
        }

        partial.buffer.extend_from_slice(fragment.payload());
        partial.next_index = found.checked_increment();

        if header.flag().is_end() {
            let declared = partial.declared_size;
            let assembled = partial.buffer.len();
            return self.complete(declared, assembled);
        }
        None
    }

    /// Abandon the in-flight frame if it outlived the timeout.
    ///
    /// Returns `true` when a frame was dropped. Intended for idle ticks when
    /// the stream stalls and no fragment arrives to trigger the check.
    pub fn expire(&mut self) -> bool { self.expire_at(Instant::now()) }

    /// Abandon the in-flight frame if it outlived the timeout at `now`.
    pub fn expire_at(&mut self, now: Instant) -> bool {
        let expired = self
            .partial
            .as_ref()
            .is_some_and(|partial| partial.expired_at(now, self.timeout));
        if expired {
            self.drop_frame(DropReason::Timeout);
        }
        expired
    }

    /// Whether a frame is currently being assembled.
    #[must_use]
    pub fn is_assembling(&self) -> bool { self.partial.is_some() }

    /// Index the next accepted fragment must carry.
    ///
    /// `None` while idle, or after a frame consumed the whole index space.
    #[must_use]
    pub fn expected_index(&self) -> Option<FragmentIndex> {
        self.partial.as_ref().and_then(|partial| partial.next_index)
    }

    /// Bytes buffered for the in-flight frame.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.partial.as_ref().map_or(0, |partial| partial.buffer.len())
    }

    /// Frame timeout applied to in-flight frames.
    #[must_use]
    pub const fn timeout(&self) -> Duration { self.timeout }

    fn complete(&mut self, declared: u32, assembled: usize) -> Option<Frame> {
        if usize::try_from(declared).ok() != Some(assembled) {
            self.drop_frame(DropReason::SizeMismatch {
                declared,
                assembled,
            });
            return None;
        }

        let partial = self.partial.take()?;
        self.stats.record_decoded();
        trace!(frame_id = %partial.frame_id, len = assembled, "frame complete");
        Some(Frame::new(partial.frame_id, partial.buffer.freeze()))
    }

    fn drop_frame(&mut self, reason: DropReason) {
        let frame_id = self.partial.take().map(|partial| partial.frame_id);
        self.stats.record_dropped();
        debug!(?frame_id, %reason, "frame dropped");
    }
}
