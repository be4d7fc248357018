//! `scopeview` binary: stream from a capture device until Ctrl+C.
//!
//! Frames are recorded to an MJPEG file with `--save`; otherwise only
//! snapshots requested by the device's save button are written.

mod cli;

use std::{error::Error, time::Duration};

use clap::Parser;
use scopeview::{
    ClientConfig,
    ScopeClient,
    sink::{MjpegFileSink, SnapshotSink},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    install_metrics(&cli)?;

    let config = ClientConfig::default()
        .with_server_ip(cli.server)
        .with_control_port(cli.port)
        .with_event_port(cli.event_port)
        .with_frame_timeout(Duration::from_millis(cli.frame_timeout_ms));
    tokio::fs::create_dir_all(&cli.output_dir).await?;

    let client = ScopeClient::bind(config).await?;
    println!("Streaming from {} (Ctrl+C to stop)", config.control_addr());
    let report = if cli.save {
        client
            .run(MjpegFileSink::create(&cli.output_dir).await?)
            .await
    } else {
        client.run(SnapshotSink::new(&cli.output_dir)).await
    };
    println!("{report}");
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_metrics(cli: &cli::Cli) -> Result<(), Box<dyn Error>> {
    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        tracing::info!(%addr, "serving Prometheus metrics");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(cli: &cli::Cli) -> Result<(), Box<dyn Error>> {
    if cli.metrics_listen.is_some() {
        tracing::warn!("built without the metrics feature; --metrics-listen ignored");
    }
    Ok(())
}
