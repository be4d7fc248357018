//! Control socket receive loop.
//!
//! [`Dispatcher`] owns the [`Reassembler`] exclusively. Each receive is
//! bounded by the configured timeout so a stalled stream still expires its
//! partial frame and a shutdown request is noticed promptly.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    net::UdpSocket,
    select,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    fragment::{Fragment, Frame, Reassembler},
    heartbeat::send_stop,
    session::Session,
    sink::FrameSink,
};

/// Single consumer of the control socket and producer of frames.
#[derive(Debug)]
pub struct Dispatcher<S> {
    socket: Arc<UdpSocket>,
    target: SocketAddr,
    receive_timeout: Duration,
    max_datagram_size: usize,
    reassembler: Reassembler,
    session: Session,
    sink: S,
    receive_failures: u64,
}

impl<S: FrameSink> Dispatcher<S> {
    /// Create a dispatcher reading from `socket` and writing frames to `sink`.
    #[must_use]
    pub fn new(socket: Arc<UdpSocket>, session: &Session, sink: S) -> Self {
        let config = session.config();
        Self {
            socket,
            target: config.control_addr(),
            receive_timeout: config.receive_timeout(),
            max_datagram_size: config.max_datagram_size(),
            reassembler: Reassembler::new(config.frame_timeout(), Arc::clone(session.stats())),
            session: session.clone(),
            sink,
            receive_failures: 0,
        }
    }

    /// Re-assembly state, for inspection.
    #[must_use]
    pub fn reassembler(&self) -> &Reassembler { &self.reassembler }

    /// Borrow the frame sink.
    #[must_use]
    pub fn sink(&self) -> &S { &self.sink }

    /// Receive until `shutdown` is cancelled, then send the stop datagram
    /// and flush the sink. Returns the sink.
    pub async fn run(mut self, shutdown: CancellationToken) -> S {
        let mut buf = vec![0_u8; self.max_datagram_size];
        loop {
            let received = select! {
                biased;

                () = shutdown.cancelled() => break,
                res = time::timeout(self.receive_timeout, self.socket.recv_from(&mut buf)) => res,
            };

            match received {
                Ok(Ok((len, _))) => self.ingest(&buf[..len]).await,
                Ok(Err(e)) => self.receive_failed(&e),
                Err(_) => {
                    self.tick();
                }
            }
        }

        self.close().await;
        self.sink
    }

    /// Process one control-port datagram.
    ///
    /// Malformed datagrams are counted and discarded without touching the
    /// re-assembly state.
    pub async fn ingest(&mut self, datagram: &[u8]) {
        self.receive_failures = 0;
        if datagram.is_empty() {
            return;
        }
        let stats = self.session.stats();
        stats.record_fragment();

        let frame = match Fragment::parse(datagram) {
            Ok(fragment) => self.reassembler.push_at(&fragment, Instant::now().into_std()),
            Err(reason) => {
                stats.record_rejected();
                trace!(%reason, len = datagram.len(), "datagram rejected");
                return;
            }
        };

        if let Some(frame) = frame {
            self.emit(frame).await;
        }
    }

    /// Expire a stalled frame when no datagram arrived within the receive
    /// timeout. Returns `true` when a frame was dropped.
    pub fn tick(&mut self) -> bool {
        let expired = self.reassembler.expire_at(Instant::now().into_std());
        if expired {
            debug!("stalled frame expired on idle tick");
        }
        expired
    }

    /// Record a failed receive.
    ///
    /// Only the first failure of a consecutive run is logged as a warning.
    /// Every failure also runs the idle expiry check, so a socket that keeps
    /// reporting errors cannot hold a stalled frame open.
    pub fn receive_failed(&mut self, error: &io::Error) {
        self.receive_failures += 1;
        if self.receive_failures == 1 {
            warn!(%error, "control socket receive failed");
        } else {
            trace!(%error, failures = self.receive_failures, "control socket receive failed again");
        }
        self.tick();
    }

    /// Consecutive receive failures since the last datagram arrived.
    #[must_use]
    pub fn receive_failures(&self) -> u64 { self.receive_failures }

    async fn emit(&mut self, frame: Frame) {
        if let Err(e) = self.sink.deliver(&frame).await {
            warn!(error = %e, frame_id = %frame.frame_id(), "frame sink failed");
        }
        if !self.session.signal().take() {
            return;
        }
        if let Err(e) = self.sink.snapshot(&frame).await {
            warn!(error = %e, frame_id = %frame.frame_id(), "snapshot failed");
        }
    }

    async fn close(&mut self) {
        if let Err(e) = send_stop(&self.socket, self.target).await {
            warn!(error = %e, "stop datagram send failed");
        }
        if let Err(e) = self.sink.finish().await {
            warn!(error = %e, "frame sink flush failed");
        }
        info!("dispatcher stopped");
    }
}
