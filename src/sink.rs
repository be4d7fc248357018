//! Consumers of completed frames.
//!
//! The dispatcher hands every completed [`Frame`] to a [`FrameSink`]. When a
//! remote save event is pending at that moment the dispatcher consumes it and
//! also calls [`FrameSink::snapshot`] with the same frame. Sink failures are
//! logged by the dispatcher and never stop the video path.

use std::{
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
};
use tracing::{debug, info};

use crate::fragment::Frame;

/// Errors raised by frame sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the filesystem failed.
    #[error("sink I/O error: {0}")]
    Io(#[from] io::Error),
    /// The receiving side of a channel sink went away.
    #[error("frame receiver dropped")]
    Closed,
}

/// Destination for completed frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Accept a completed frame.
    async fn deliver(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Persist `frame` in response to a remote save event.
    async fn snapshot(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let _ = frame;
        Ok(())
    }

    /// Flush buffered output before the client exits.
    async fn finish(&mut self) -> Result<(), SinkError> { Ok(()) }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

/// Writes single frames as `frame_<unix-millis>.jpg` files.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    /// Write snapshots into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    /// Directory receiving snapshots.
    #[must_use]
    pub fn dir(&self) -> &Path { &self.dir }

    /// Write `frame` to a new timestamped file and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] when the file cannot be written.
    pub async fn write(&self, frame: &Frame) -> Result<PathBuf, SinkError> {
        let path = self.dir.join(format!("frame_{}.jpg", unix_millis()));
        fs::write(&path, frame.payload()).await?;
        info!(path = %path.display(), "frame saved due to remote event");
        Ok(path)
    }
}

/// Appends every frame to one `stream_<unix-millis>.mjpeg` file.
#[derive(Debug)]
pub struct MjpegFileSink {
    path: PathBuf,
    file: BufWriter<File>,
    snapshots: SnapshotWriter,
}

impl MjpegFileSink {
    /// Create the stream file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] when the file cannot be created.
    pub async fn create(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref();
        let path = dir.join(format!("stream_{}.mjpeg", unix_millis()));
        let file = File::create(&path).await?;
        info!(path = %path.display(), "saving MJPEG stream");
        Ok(Self {
            path,
            file: BufWriter::new(file),
            snapshots: SnapshotWriter::new(dir),
        })
    }

    /// Path of the stream file.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

#[async_trait]
impl FrameSink for MjpegFileSink {
    async fn deliver(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.file.write_all(frame.payload()).await?;
        Ok(())
    }

    async fn snapshot(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.snapshots.write(frame).await.map(drop)
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.file.flush().await?;
        info!(path = %self.path.display(), "MJPEG stream saved");
        Ok(())
    }
}

/// Headless sink: logs frames and saves snapshots on remote events.
#[derive(Debug)]
pub struct SnapshotSink {
    snapshots: SnapshotWriter,
}

impl SnapshotSink {
    /// Save snapshots into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: SnapshotWriter::new(dir),
        }
    }
}

#[async_trait]
impl FrameSink for SnapshotSink {
    async fn deliver(&mut self, frame: &Frame) -> Result<(), SinkError> {
        debug!(frame_id = %frame.frame_id(), len = frame.len(), "frame received");
        Ok(())
    }

    async fn snapshot(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.snapshots.write(frame).await.map(drop)
    }
}

/// Item forwarded by [`ChannelSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// A completed frame.
    Frame(Frame),
    /// The same frame, flagged by a remote save event.
    Snapshot(Frame),
}

/// Forwards frames to an in-process consumer.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<SinkEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes it.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SinkEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn deliver(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.tx
            .send(SinkEvent::Frame(frame.clone()))
            .await
            .map_err(|_| SinkError::Closed)
    }

    async fn snapshot(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.tx
            .send(SinkEvent::Snapshot(frame.clone()))
            .await
            .map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::{ChannelSink, FrameSink, MjpegFileSink, SinkError, SinkEvent, SnapshotSink};
    use crate::fragment::{Frame, FrameId};

    #[fixture]
    fn out_dir() -> TempDir { TempDir::new().expect("create temp dir") }

    fn frame(bytes: &'static [u8]) -> Frame { Frame::new(FrameId::new(1), bytes) }

    #[rstest]
    #[tokio::test]
    async fn mjpeg_sink_appends_frames(out_dir: TempDir) {
        let mut sink = MjpegFileSink::create(out_dir.path())
            .await
            .expect("create stream file");
        sink.deliver(&frame(b"\xff\xd8one\xff\xd9")).await.expect("write frame");
        sink.deliver(&frame(b"\xff\xd8two\xff\xd9")).await.expect("write frame");
        sink.finish().await.expect("flush");

        let written = std::fs::read(sink.path()).expect("read stream file");
        assert_eq!(written, b"\xff\xd8one\xff\xd9\xff\xd8two\xff\xd9");
        let name = sink
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .expect("utf-8 file name");
        assert!(name.starts_with("stream_") && name.ends_with(".mjpeg"));
    }

    #[rstest]
    #[tokio::test]
    async fn snapshot_sink_writes_jpeg_on_event(out_dir: TempDir) {
        let mut sink = SnapshotSink::new(out_dir.path());
        sink.deliver(&frame(b"ignored")).await.expect("deliver");
        assert_eq!(std::fs::read_dir(out_dir.path()).expect("list").count(), 0);

        sink.snapshot(&frame(b"saved")).await.expect("snapshot");
        let entries: Vec<_> = std::fs::read_dir(out_dir.path())
            .expect("list")
            .map(|e| e.expect("entry").path())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read(&entries[0]).expect("read snapshot"), b"saved");
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_receiver() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.deliver(&frame(b"a")).await.expect("deliver");
        sink.snapshot(&frame(b"a")).await.expect("snapshot");
        assert_eq!(rx.recv().await, Some(SinkEvent::Frame(frame(b"a"))));
        assert_eq!(rx.recv().await, Some(SinkEvent::Snapshot(frame(b"a"))));

        drop(rx);
        assert!(matches!(
            sink.deliver(&frame(b"b")).await,
            Err(SinkError::Closed)
        ));
    }
}
