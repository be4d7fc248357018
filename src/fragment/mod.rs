//! Video fragment primitives and the single-frame re-assembler.
//!
//! The capture device splits each compressed frame across several UDP
//! datagrams. Each sub-module focuses on one concept: the 24-byte datagram
//! header, the small integer newtypes it carries, rejection and drop reasons,
//! and the strict in-order [`Reassembler`].

pub mod error;
pub mod header;
pub mod id;
pub mod index;
pub mod reassembler;

pub use error::{DatagramError, DropReason};
pub use header::{FRAGMENT_HEADER_LEN, FRAGMENT_MAGIC, FRAGMENT_MARKER, Fragment, FragmentHeader, FrameFlag};
pub use id::FrameId;
pub use index::FragmentIndex;
pub use reassembler::{Frame, Reassembler};

#[cfg(test)]
mod tests;
