//! Loopback stand-in for the capture device.
//!
//! Each integration test binary includes this module, so helpers unused by a
//! particular binary are expected.
#![allow(dead_code)]

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicU16, Ordering},
    },
    time::Duration,
};

use scopeview::{
    ClientConfig,
    Fragment,
    FragmentIndex,
    FrameFlag,
    FrameId,
    event::{EVENT_REQUEST_LEN, EventResponse},
};
use tokio::{net::UdpSocket, task::JoinHandle, time::timeout};

/// Upper bound for any single wait in the integration tests.
pub const WAIT: Duration = Duration::from_secs(2);

/// Split `payload` into encoded fragment datagrams of at most `chunk` bytes.
pub fn fragments(frame_id: u8, payload: &[u8], chunk: usize) -> Vec<Vec<u8>> {
    let size = u32::try_from(payload.len()).expect("payload fits u32");
    let chunks: Vec<&[u8]> = payload.chunks(chunk.max(1)).collect();
    let last = chunks.len() - 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            let flag = match (i, last) {
                (0, 0) => FrameFlag::Single,
                (0, _) => FrameFlag::Start,
                (i, last) if i == last => FrameFlag::End,
                _ => FrameFlag::Continuation,
            };
            let index = FragmentIndex::new(u16::try_from(i).expect("index fits u16"));
            Fragment::new(flag, FrameId::new(frame_id), size, index, bytes)
                .expect("chunk fits the length field")
                .to_datagram()
        })
        .collect()
}

/// Device sockets bound to ephemeral loopback ports.
pub struct FakeDevice {
    pub control: UdpSocket,
    pub event: UdpSocket,
}

impl FakeDevice {
    pub async fn bind() -> Self {
        let control = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind device control socket");
        let event = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind device event socket");
        Self { control, event }
    }

    /// Keep `control` and bind a fresh, silent event socket.
    pub async fn from_control(control: UdpSocket) -> Self {
        let event = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind device event socket");
        Self { control, event }
    }

    /// Client configuration targeting this device with fast timers.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_server_ip(Ipv4Addr::LOCALHOST.into())
            .with_control_port(self.control.local_addr().expect("control addr").port())
            .with_event_port(self.event.local_addr().expect("event addr").port())
            .with_heartbeat_interval(Duration::from_millis(20))
            .with_receive_timeout(Duration::from_millis(20))
            .with_event_interval(Duration::from_millis(20))
            .with_event_response_timeout(Duration::from_millis(200))
    }

    /// Next datagram on the control port and its sender.
    pub async fn recv_control(&self) -> (Vec<u8>, SocketAddr) {
        let mut buf = [0_u8; 64];
        let (len, from) = timeout(WAIT, self.control.recv_from(&mut buf))
            .await
            .expect("control datagram within wait")
            .expect("receive control datagram");
        (buf[..len].to_vec(), from)
    }

    /// Wait until `expected` arrives on the control port, skipping others.
    pub async fn await_control(&self, expected: &[u8]) -> SocketAddr {
        loop {
            let (datagram, from) = self.recv_control().await;
            if datagram == expected {
                return from;
            }
        }
    }

    /// Send every fragment of a frame to `client`.
    pub async fn send_frame(&self, client: SocketAddr, frame_id: u8, payload: &[u8], chunk: usize) {
        for datagram in fragments(frame_id, payload, chunk) {
            self.control
                .send_to(&datagram, client)
                .await
                .expect("send fragment");
        }
    }
}

/// Answer every event request with the current value of `server_counter`.
pub fn spawn_event_responder(event: UdpSocket, server_counter: Arc<AtomicU16>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0_u8; 64];
        while let Ok((len, from)) = event.recv_from(&mut buf).await {
            if len != EVENT_REQUEST_LEN {
                continue;
            }
            let request = u16::from_le_bytes([buf[6], buf[7]]);
            let response =
                EventResponse::new(request, server_counter.load(Ordering::SeqCst)).encode();
            if event.send_to(&response, from).await.is_err() {
                break;
            }
        }
    })
}
