//! Liveness datagrams on the control port.
//!
//! The device keeps streaming only while it receives a heartbeat every few
//! hundred milliseconds. A distinct stop datagram tells it the client is
//! leaving; the dispatcher sends that one at shutdown.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use log::warn;
use tokio::{
    net::UdpSocket,
    select,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// Length of the heartbeat and stop datagrams.
pub const CONTROL_DATAGRAM_LEN: usize = 24;

/// Periodic keep-alive datagram.
pub const HEARTBEAT: [u8; CONTROL_DATAGRAM_LEN] = control_datagram(0x01);
/// One-shot disconnect datagram.
pub const STOP: [u8; CONTROL_DATAGRAM_LEN] = control_datagram(0x02);

const fn control_datagram(kind: u8) -> [u8; CONTROL_DATAGRAM_LEN] {
    let mut buf = [0_u8; CONTROL_DATAGRAM_LEN];
    buf[0] = 0x99;
    buf[1] = 0x99;
    buf[2] = kind;
    buf
}

/// Best-effort heartbeat emitter sharing the control socket.
#[derive(Debug)]
pub struct HeartbeatSender {
    socket: Arc<UdpSocket>,
    target: SocketAddr,
    interval: Duration,
}

impl HeartbeatSender {
    /// Create a sender that targets `target` every `interval`.
    #[must_use]
    pub fn new(socket: Arc<UdpSocket>, target: SocketAddr, interval: Duration) -> Self {
        Self {
            socket,
            target,
            interval,
        }
    }

    /// Send a single heartbeat.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the socket.
    pub async fn beat(&self) -> io::Result<()> {
        self.socket.send_to(&HEARTBEAT, self.target).await.map(drop)
    }

    /// Send heartbeats until `shutdown` is cancelled.
    ///
    /// Send failures are logged and retried on the next tick without backoff.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            select! {
                biased;

                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if let Err(e) = self.beat().await {
                warn!("heartbeat send failed: target={}, error={e}", self.target);
            }
        }
    }
}

/// Tell the device the client is disconnecting.
///
/// # Errors
///
/// Returns any I/O error raised by the socket.
pub async fn send_stop(socket: &UdpSocket, target: SocketAddr) -> io::Result<()> {
    socket.send_to(&STOP, target).await.map(drop)
}

#[cfg(test)]
mod tests {
    use super::{CONTROL_DATAGRAM_LEN, HEARTBEAT, STOP};

    #[test]
    fn control_datagrams_match_device_patterns() {
        let mut heartbeat = [0_u8; CONTROL_DATAGRAM_LEN];
        heartbeat[..3].copy_from_slice(&[0x99, 0x99, 0x01]);
        let mut stop = [0_u8; CONTROL_DATAGRAM_LEN];
        stop[..3].copy_from_slice(&[0x99, 0x99, 0x02]);

        assert_eq!(HEARTBEAT, heartbeat);
        assert_eq!(STOP, stop);
        assert_ne!(HEARTBEAT, STOP);
    }
}
