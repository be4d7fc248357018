//! Client runtime.
//!
//! [`ScopeClient`] binds both UDP sockets up front and then runs three
//! tasks under one [`TaskTracker`]: the heartbeat sender, the event poller
//! and the control socket dispatcher. A single [`CancellationToken`] stops
//! them all.

use std::{future::Future, io, net::SocketAddr, sync::Arc};

use tokio::{net::UdpSocket, select, signal};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{info, warn};

use crate::{
    config::ClientConfig,
    dispatcher::Dispatcher,
    error::ClientError,
    event::EventChannel,
    heartbeat::HeartbeatSender,
    session::Session,
    sink::FrameSink,
    stats::StatisticsSnapshot,
};

/// Bound client ready to start streaming.
///
/// # Examples
///
/// ```no_run
/// use scopeview::{ClientConfig, ScopeClient, sink::SnapshotSink};
///
/// # async fn demo() -> Result<(), scopeview::ClientError> {
/// let client = ScopeClient::bind(ClientConfig::default()).await?;
/// let report = client.run(SnapshotSink::new(".")).await;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScopeClient {
    session: Session,
    control: Arc<UdpSocket>,
    event: EventChannel,
}

impl ScopeClient {
    /// Bind the control and event sockets for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if either socket cannot be bound.
    pub async fn bind(config: ClientConfig) -> Result<Self, ClientError> {
        let session = Session::new(config);
        let control = UdpSocket::bind(config.local_bind_addr())
            .await
            .map_err(ClientError::BindControl)?;
        let event = EventChannel::bind(&session)
            .await
            .map_err(ClientError::BindEvent)?;
        Ok(Self {
            session,
            control: Arc::new(control),
            event,
        })
    }

    /// Shared session handles.
    #[must_use]
    pub const fn session(&self) -> &Session { &self.session }

    /// Local address of the control socket.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported by the socket.
    pub fn control_local_addr(&self) -> io::Result<SocketAddr> { self.control.local_addr() }

    /// Local address of the event socket.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported by the socket.
    pub fn event_local_addr(&self) -> io::Result<SocketAddr> { self.event.local_addr() }

    /// Stream until Ctrl+C is received.
    pub async fn run<S>(self, sink: S) -> StatisticsSnapshot
    where
        S: FrameSink + 'static,
    {
        self.run_with_shutdown(sink, async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Stream until `shutdown` resolves, then return the final statistics.
    ///
    /// If any task ends first, for example because the sink panicked, the
    /// remaining tasks are cancelled as well. On shutdown every task finishes
    /// its current iteration, the dispatcher sends the stop datagram and
    /// flushes `sink`, and only then does this future complete.
    pub async fn run_with_shutdown<S, F>(self, sink: S, shutdown: F) -> StatisticsSnapshot
    where
        S: FrameSink + 'static,
        F: Future<Output = ()> + Send,
    {
        let Self {
            session,
            control,
            event,
        } = self;
        let config = session.config();
        let token = session.shutdown().clone();
        let tracker = TaskTracker::new();

        let heartbeat = HeartbeatSender::new(
            Arc::clone(&control),
            config.control_addr(),
            config.heartbeat_interval(),
        );
        spawn_linked(&tracker, &token, heartbeat.run(token.clone()));
        spawn_linked(&tracker, &token, event.run(token.clone()));

        let dispatcher = Dispatcher::new(control, &session, sink);
        let dispatcher_token = token.clone();
        spawn_linked(&tracker, &token, async move {
            dispatcher.run(dispatcher_token).await;
        });
        tracker.close();
        info!(server = %config.control_addr(), "client started");

        select! {
            () = shutdown => session.request_shutdown(),
            () = token.cancelled() => warn!("client shut down before the shutdown signal"),
        }

        tracker.wait().await;
        let report = session.stats().snapshot();
        info!(
            frames_decoded = report.frames_decoded,
            frames_dropped = report.frames_dropped,
            "client stopped"
        );
        report
    }
}

/// Spawn `task` so that its end, including a panic, cancels `token`.
fn spawn_linked<F>(tracker: &TaskTracker, token: &CancellationToken, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let guard = token.clone().drop_guard();
    tracker.spawn(async move {
        let _guard = guard;
        task.await;
    });
}
