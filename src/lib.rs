#![doc(html_root_url = "https://docs.rs/scopeview/latest")]
//! Client for UDP MJPEG capture devices.
//!
//! The device streams JPEG frames split into fragments over a control port
//! and keeps streaming only while it receives heartbeats. A second port
//! exposes a polled counter that changes when the device's "save" button is
//! pressed. This crate re-assembles the fragments into frames, keeps the
//! stream alive and turns counter changes into snapshot requests.

pub mod byte_order;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod fragment;
pub mod heartbeat;
pub mod metrics;
pub mod session;
pub mod sink;
pub mod stats;

pub use client::ScopeClient;
pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use error::ClientError;
pub use event::{EventChannel, EventMonitor, EventSignal, PollOutcome};
pub use fragment::{
    DatagramError,
    DropReason,
    FRAGMENT_HEADER_LEN,
    Fragment,
    FragmentHeader,
    FragmentIndex,
    Frame,
    FrameFlag,
    FrameId,
    Reassembler,
};
pub use heartbeat::{HEARTBEAT, HeartbeatSender, STOP};
pub use session::Session;
pub use sink::{FrameSink, SinkError};
pub use stats::{Statistics, StatisticsSnapshot};
