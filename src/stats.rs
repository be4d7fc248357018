//! Monotonic counters reported when the client exits.
//!
//! [`Statistics`] is written by the dispatcher task and its re-assembler only.
//! Other tasks read it through [`Statistics::snapshot`].

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::metrics::{self, FrameOutcome};

/// Shared counters for the video path.
#[derive(Debug, Default)]
pub struct Statistics {
    fragments_received: AtomicU64,
    datagrams_rejected: AtomicU64,
    frames_decoded: AtomicU64,
    frames_dropped: AtomicU64,
}

impl Statistics {
    /// Create a zeroed set of counters.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Count a datagram read from the control socket.
    pub fn record_fragment(&self) {
        self.fragments_received.fetch_add(1, Ordering::Relaxed);
        metrics::inc_fragments();
    }

    /// Count a datagram discarded before re-assembly.
    pub fn record_rejected(&self) {
        self.datagrams_rejected.fetch_add(1, Ordering::Relaxed);
        metrics::inc_rejected();
    }

    /// Count a frame emitted by the re-assembler.
    pub fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        metrics::inc_frames(FrameOutcome::Decoded);
    }

    /// Count a frame abandoned by the re-assembler.
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
        metrics::inc_frames(FrameOutcome::Dropped);
    }

    /// Datagrams read from the control socket.
    #[must_use]
    pub fn fragments_received(&self) -> u64 { self.fragments_received.load(Ordering::Relaxed) }

    /// Datagrams discarded as malformed.
    #[must_use]
    pub fn datagrams_rejected(&self) -> u64 { self.datagrams_rejected.load(Ordering::Relaxed) }

    /// Frames emitted to the sink.
    #[must_use]
    pub fn frames_decoded(&self) -> u64 { self.frames_decoded.load(Ordering::Relaxed) }

    /// Frames abandoned before completion.
    #[must_use]
    pub fn frames_dropped(&self) -> u64 { self.frames_dropped.load(Ordering::Relaxed) }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            fragments_received: self.fragments_received(),
            datagrams_rejected: self.datagrams_rejected(),
            frames_decoded: self.frames_decoded(),
            frames_dropped: self.frames_dropped(),
        }
    }
}

/// Point-in-time copy of [`Statistics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Datagrams read from the control socket.
    pub fragments_received: u64,
    /// Datagrams discarded as malformed.
    pub datagrams_rejected: u64,
    /// Frames emitted to the sink.
    pub frames_decoded: u64,
    /// Frames abandoned before completion.
    pub frames_dropped: u64,
}

impl fmt::Display for StatisticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Statistics ===")?;
        writeln!(f, "Frames decoded: {}", self.frames_decoded)?;
        writeln!(f, "Frames dropped: {}", self.frames_dropped)?;
        writeln!(f, "Fragments received: {}", self.fragments_received)?;
        write!(f, "Datagrams rejected: {}", self.datagrams_rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::{Statistics, StatisticsSnapshot};

    #[test]
    fn snapshot_reflects_recorded_counts() {
        let stats = Statistics::new();
        stats.record_fragment();
        stats.record_fragment();
        stats.record_rejected();
        stats.record_decoded();
        stats.record_dropped();
        stats.record_dropped();

        assert_eq!(
            stats.snapshot(),
            StatisticsSnapshot {
                fragments_received: 2,
                datagrams_rejected: 1,
                frames_decoded: 1,
                frames_dropped: 2,
            }
        );
    }

    #[test]
    fn report_lists_every_counter() {
        let report = StatisticsSnapshot {
            fragments_received: 7,
            datagrams_rejected: 1,
            frames_decoded: 2,
            frames_dropped: 3,
        }
        .to_string();

        assert!(report.starts_with("=== Statistics ==="));
        assert!(report.contains("Frames decoded: 2"));
        assert!(report.contains("Frames dropped: 3"));
        assert!(report.contains("Fragments received: 7"));
        assert!(report.contains("Datagrams rejected: 1"));
    }
}
