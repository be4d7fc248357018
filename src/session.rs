//! Context shared by the client's concurrent tasks.
//!
//! A [`Session`] is created once at startup and cloned into the heartbeat,
//! event and dispatcher tasks. Only the fields here cross task boundaries:
//! the shutdown token, the remote event signal and the statistics. The
//! re-assembly state never leaves the dispatcher.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{config::ClientConfig, event::EventSignal, stats::Statistics};

/// Shared handles for one client run.
#[derive(Clone, Debug)]
pub struct Session {
    config: ClientConfig,
    shutdown: CancellationToken,
    signal: EventSignal,
    stats: Arc<Statistics>,
}

impl Session {
    /// Create a fresh session for `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            signal: EventSignal::new(),
            stats: Arc::new(Statistics::new()),
        }
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig { &self.config }

    /// Cooperative shutdown flag observed by every task loop.
    #[must_use]
    pub const fn shutdown(&self) -> &CancellationToken { &self.shutdown }

    /// Ask every task to stop at its next loop iteration.
    pub fn request_shutdown(&self) { self.shutdown.cancel(); }

    /// Whether shutdown was requested.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool { self.shutdown.is_cancelled() }

    /// Remote save signal.
    #[must_use]
    pub const fn signal(&self) -> &EventSignal { &self.signal }

    /// Video path counters.
    #[must_use]
    pub fn stats(&self) -> &Arc<Statistics> { &self.stats }
}
