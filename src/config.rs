//! Client configuration.
//!
//! [`ClientConfig`] carries the device address, both UDP ports and every
//! timer the tasks use. Defaults match the capture device's firmware.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

/// Default address of the capture device.
pub const DEFAULT_SERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 10, 123));
/// Default control/video port.
pub const DEFAULT_CONTROL_PORT: u16 = 8030;
/// Default event port.
pub const DEFAULT_EVENT_PORT: u16 = 50_000;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Addresses and timers used by the client tasks.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use scopeview::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_control_port(9000)
///     .with_frame_timeout(Duration::from_millis(500));
/// assert_eq!(config.control_addr().port(), 9000);
/// assert_eq!(config.frame_timeout(), Duration::from_millis(500));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    server_ip: IpAddr,
    control_port: u16,
    event_port: u16,
    heartbeat_interval: Duration,
    receive_timeout: Duration,
    frame_timeout: Duration,
    event_interval: Duration,
    event_response_timeout: Duration,
    max_datagram_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_ip: DEFAULT_SERVER_IP,
            control_port: DEFAULT_CONTROL_PORT,
            event_port: DEFAULT_EVENT_PORT,
            heartbeat_interval: Duration::from_millis(500),
            receive_timeout: Duration::from_secs(1),
            frame_timeout: Duration::from_secs(1),
            event_interval: Duration::from_millis(100),
            event_response_timeout: Duration::from_millis(30),
            max_datagram_size: 65_535,
        }
    }
}

impl ClientConfig {
    /// Set the device address.
    #[must_use]
    pub fn with_server_ip(mut self, ip: IpAddr) -> Self {
        self.server_ip = ip;
        self
    }

    /// Set the control/video port.
    #[must_use]
    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    /// Set the event port.
    #[must_use]
    pub fn with_event_port(mut self, port: u16) -> Self {
        self.event_port = port;
        self
    }

    /// Set the heartbeat period.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval.max(MIN_PERIOD);
        self
    }

    /// Bound each control socket receive so idle ticks run while the stream
    /// is silent.
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout.max(MIN_PERIOD);
        self
    }

    /// Set how long a frame may stay incomplete.
    #[must_use]
    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    /// Set the event poll period.
    #[must_use]
    pub fn with_event_interval(mut self, interval: Duration) -> Self {
        self.event_interval = interval.max(MIN_PERIOD);
        self
    }

    /// Set how long to wait for each event response.
    #[must_use]
    pub fn with_event_response_timeout(mut self, timeout: Duration) -> Self {
        self.event_response_timeout = timeout.max(MIN_PERIOD);
        self
    }

    /// Set the control socket receive buffer size.
    #[must_use]
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size.max(crate::fragment::FRAGMENT_HEADER_LEN);
        self
    }

    /// Device address.
    #[must_use]
    pub const fn server_ip(&self) -> IpAddr { self.server_ip }

    /// Device control/video endpoint.
    #[must_use]
    pub const fn control_addr(&self) -> SocketAddr { SocketAddr::new(self.server_ip, self.control_port) }

    /// Device event endpoint.
    #[must_use]
    pub const fn event_addr(&self) -> SocketAddr { SocketAddr::new(self.server_ip, self.event_port) }

    /// Heartbeat period.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration { self.heartbeat_interval }

    /// Control socket receive bound.
    #[must_use]
    pub const fn receive_timeout(&self) -> Duration { self.receive_timeout }

    /// Incomplete frame lifetime.
    #[must_use]
    pub const fn frame_timeout(&self) -> Duration { self.frame_timeout }

    /// Event poll period.
    #[must_use]
    pub const fn event_interval(&self) -> Duration { self.event_interval }

    /// Event response wait.
    #[must_use]
    pub const fn event_response_timeout(&self) -> Duration { self.event_response_timeout }

    /// Control socket receive buffer size.
    #[must_use]
    pub const fn max_datagram_size(&self) -> usize { self.max_datagram_size }

    /// Local wildcard address matching the device's address family.
    #[must_use]
    pub(crate) const fn local_bind_addr(&self) -> SocketAddr {
        match self.server_ip {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{Ipv4Addr, SocketAddr},
        time::Duration,
    };

    use super::{ClientConfig, DEFAULT_CONTROL_PORT, DEFAULT_EVENT_PORT, DEFAULT_SERVER_IP};

    #[test]
    fn defaults_match_device_firmware() {
        let config = ClientConfig::default();
        assert_eq!(config.server_ip(), DEFAULT_SERVER_IP);
        assert_eq!(config.control_addr().port(), DEFAULT_CONTROL_PORT);
        assert_eq!(config.event_addr().port(), DEFAULT_EVENT_PORT);
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(500));
        assert_eq!(config.receive_timeout(), Duration::from_secs(1));
        assert_eq!(config.frame_timeout(), Duration::from_secs(1));
        assert_eq!(config.event_interval(), Duration::from_millis(100));
        assert_eq!(config.event_response_timeout(), Duration::from_millis(30));
    }

    #[test]
    fn zero_periods_are_clamped() {
        let config = ClientConfig::default()
            .with_heartbeat_interval(Duration::ZERO)
            .with_event_interval(Duration::ZERO)
            .with_receive_timeout(Duration::ZERO);
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(1));
        assert_eq!(config.event_interval(), Duration::from_millis(1));
        assert_eq!(config.receive_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn addresses_follow_server_ip() {
        let config = ClientConfig::default().with_server_ip(Ipv4Addr::LOCALHOST.into());
        assert_eq!(
            config.control_addr(),
            SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_CONTROL_PORT))
        );
        assert_eq!(config.local_bind_addr().ip(), Ipv4Addr::UNSPECIFIED);
    }
}
