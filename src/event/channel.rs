//! Polling task for the device's remote "save now" trigger.

use std::{io, net::SocketAddr, time::Duration};

use log::debug;
use tokio::{
    net::UdpSocket,
    select,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{
    EVENT_RESPONSE_LEN,
    EventMonitor,
    EventRequest,
    EventResponse,
    EventSignal,
    RequestCounter,
    ResponseError,
};
use crate::{metrics, session::Session};

/// Result of one request/response exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The request could not be sent.
    SendFailed,
    /// Reading from the socket failed.
    ReceiveFailed,
    /// Nothing arrived within the response timeout.
    TimedOut,
    /// Only datagrams that failed validation arrived; the last reason is kept.
    Ignored(ResponseError),
    /// A valid response was observed.
    Observed {
        /// Device event counter carried by the response.
        server_counter: u16,
        /// Whether the counter changed from the baseline.
        triggered: bool,
    },
}

/// Request/response poller bound to its own UDP socket.
///
/// The baseline and request counter are owned by this task alone; the only
/// state it shares is the [`EventSignal`].
#[derive(Debug)]
pub struct EventChannel {
    socket: UdpSocket,
    target: SocketAddr,
    interval: Duration,
    response_timeout: Duration,
    counter: RequestCounter,
    monitor: EventMonitor,
    signal: EventSignal,
}

impl EventChannel {
    /// Bind an ephemeral socket and target the session's event endpoint.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while binding the socket.
    pub async fn bind(session: &Session) -> io::Result<Self> {
        let socket = UdpSocket::bind(session.config().local_bind_addr()).await?;
        Ok(Self::new(socket, session))
    }

    /// Wrap an already bound socket.
    #[must_use]
    pub fn new(socket: UdpSocket, session: &Session) -> Self {
        let config = session.config();
        Self {
            socket,
            target: config.event_addr(),
            interval: config.event_interval(),
            response_timeout: config.event_response_timeout(),
            counter: RequestCounter::default(),
            monitor: EventMonitor::new(),
            signal: session.signal().clone(),
        }
    }

    /// Replace the request counter, e.g. to resume a sequence.
    #[must_use]
    pub fn with_counter(mut self, counter: RequestCounter) -> Self {
        self.counter = counter;
        self
    }

    /// Baseline tracker state.
    #[must_use]
    pub const fn monitor(&self) -> &EventMonitor { &self.monitor }

    /// Counter the next request will carry.
    #[must_use]
    pub const fn next_counter(&self) -> u16 { self.counter.peek() }

    /// Local address of the event socket.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported by the socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> { self.socket.local_addr() }

    /// Poll the device until `shutdown` is cancelled.
    ///
    /// Every failure is swallowed; the next tick simply tries again.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            select! {
                biased;

                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.poll_once().await;
        }
    }

    /// Send one request and wait for its response.
    ///
    /// Responses to superseded requests and malformed datagrams are skipped
    /// while the response window is still open.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let request = EventRequest::new(self.counter.next_value());
        if let Err(e) = self.socket.send_to(&request.encode(), self.target).await {
            debug!("event request send failed: target={}, error={e}", self.target);
            return PollOutcome::SendFailed;
        }

        let deadline = Instant::now() + self.response_timeout;
        let mut buf = [0_u8; EVENT_RESPONSE_LEN + 1];
        let mut rejected = None;
        loop {
            let len = match time::timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Err(_) => {
                    return rejected.map_or(PollOutcome::TimedOut, PollOutcome::Ignored);
                }
                Ok(Err(e)) => {
                    debug!("event response receive failed: error={e}");
                    return PollOutcome::ReceiveFailed;
                }
                Ok(Ok((len, _))) => len,
            };

            match EventResponse::parse(&buf[..len], request.counter()) {
                Ok(response) => return self.observe(response),
                Err(reason) => rejected = Some(reason),
            }
        }
    }

    fn observe(&mut self, response: EventResponse) -> PollOutcome {
        let server_counter = response.server_counter();
        let triggered = self.monitor.observe(server_counter);
        if triggered {
            info!(server_counter, "remote save event");
            metrics::inc_remote_events();
            self.signal.raise();
        }
        PollOutcome::Observed {
            server_counter,
            triggered,
        }
    }
}
