//! Command line interface for the `scopeview` binary.
//!
//! Shared with `build.rs`, which renders the man page from it, so this file
//! must not depend on the library crate.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;

/// Command line arguments for the `scopeview` binary.
#[derive(Debug, Parser)]
#[command(
    name = "scopeview",
    version,
    about = "Receive and record MJPEG video from a UDP capture device"
)]
pub struct Cli {
    /// Address of the capture device.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::new(192, 168, 10, 123)))]
    pub server: IpAddr,

    /// Control/video port on the device.
    #[arg(long, default_value_t = 8030)]
    pub port: u16,

    /// Event port on the device.
    #[arg(long, default_value_t = 50_000)]
    pub event_port: u16,

    /// Append every frame to a timestamped `.mjpeg` file.
    #[arg(long)]
    pub save: bool,

    /// Directory receiving the stream file and snapshots.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Milliseconds an incomplete frame may wait for its next fragment.
    #[arg(long, default_value_t = 1000)]
    pub frame_timeout_ms: u64,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_listen: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        path::Path,
    };

    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_target_the_stock_device() {
        let cli = Cli::parse_from(["scopeview"]);
        assert_eq!(cli.server, IpAddr::V4(Ipv4Addr::new(192, 168, 10, 123)));
        assert_eq!(cli.port, 8030);
        assert_eq!(cli.event_port, 50_000);
        assert!(!cli.save);
        assert_eq!(cli.output_dir, Path::new("."));
        assert_eq!(cli.frame_timeout_ms, 1000);
        assert!(cli.metrics_listen.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "scopeview",
            "--server",
            "10.0.0.2",
            "--port",
            "9000",
            "--event-port",
            "9001",
            "--save",
            "--output-dir",
            "/tmp/captures",
            "--frame-timeout-ms",
            "250",
            "--metrics-listen",
            "127.0.0.1:9100",
        ]);
        assert_eq!(cli.server, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.event_port, 9001);
        assert!(cli.save);
        assert_eq!(cli.output_dir, Path::new("/tmp/captures"));
        assert_eq!(cli.frame_timeout_ms, 250);
        assert_eq!(
            cli.metrics_listen.map(|addr| addr.port()),
            Some(9100)
        );
    }

    #[test]
    fn rejects_invalid_server_address() {
        assert!(Cli::try_parse_from(["scopeview", "--server", "not-an-ip"]).is_err());
    }
}
