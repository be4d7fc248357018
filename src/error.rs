//! Setup errors that end the process.
//!
//! Everything after startup is logged and retried; only failing to bind a
//! socket surfaces as a [`ClientError`].

use std::io;

use thiserror::Error;

/// Errors raised while preparing the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The control/video socket could not be bound.
    #[error("failed to bind control socket: {0}")]
    BindControl(#[source] io::Error),
    /// The event socket could not be bound.
    #[error("failed to bind event socket: {0}")]
    BindEvent(#[source] io::Error),
}
