#![cfg(feature = "metrics")]
//! Tests for `scopeview` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;
use scopeview::{
    Fragment,
    FragmentIndex,
    FrameFlag,
    FrameId,
    Reassembler,
    Statistics,
    metrics::{self as m, FrameOutcome},
};

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter_value(snapshotter: &Snapshotter, name: &str, outcome: Option<&str>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && outcome.is_none_or(|o| {
                    k.key()
                        .labels()
                        .any(|l| l.key() == "outcome" && l.value() == o)
                })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case::decoded(FrameOutcome::Decoded, "decoded")]
#[case::dropped(FrameOutcome::Dropped, "dropped")]
fn frame_outcome_is_labelled(#[case] outcome: FrameOutcome, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || m::inc_frames(outcome));

    assert_eq!(counter_value(&snapshotter, m::FRAMES_TOTAL, Some(label)), 1);
}

#[rstest]
#[case(1)]
#[case(3)]
fn remote_events_are_counted(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        (0..expected).for_each(|_| m::inc_remote_events());
    });

    assert_eq!(counter_value(&snapshotter, m::REMOTE_EVENTS, None), expected);
}

#[test]
fn reassembly_updates_fragment_and_frame_counters() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let stats = Arc::new(Statistics::new());
        let mut reassembler = Reassembler::new(std::time::Duration::from_secs(1), Arc::clone(&stats));
        let push = |r: &mut Reassembler, flag, index, payload: &[u8]| {
            stats.record_fragment();
            let fragment = Fragment::new(flag, FrameId::new(1), 4, FragmentIndex::new(index), payload)
                .expect("small payload");
            r.push(&fragment)
        };

        assert!(push(&mut reassembler, FrameFlag::Start, 0, b"ab").is_none());
        assert!(push(&mut reassembler, FrameFlag::End, 1, b"cd").is_some());
        assert!(push(&mut reassembler, FrameFlag::Start, 0, b"ab").is_none());
        assert!(push(&mut reassembler, FrameFlag::End, 5, b"cd").is_none());
        stats.record_rejected();
    });

    assert_eq!(counter_value(&snapshotter, m::FRAGMENTS_RECEIVED, None), 4);
    assert_eq!(counter_value(&snapshotter, m::DATAGRAMS_REJECTED, None), 1);
    assert_eq!(counter_value(&snapshotter, m::FRAMES_TOTAL, Some("decoded")), 1);
    assert_eq!(counter_value(&snapshotter, m::FRAMES_TOTAL, Some("dropped")), 1);
}
