use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upload to {endpoint} rejected with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("frame data does not match {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
}

/// A frame the gate decided to keep, already at display size.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub frame: Frame,
    /// 1-based count of captures in this session.
    pub number: usize,
    /// When the gate fired; delivery latency is measured from here.
    pub taken_at: Instant,
}

impl Snapshot {
    pub fn new(frame: Frame, number: usize) -> Self {
        Self {
            frame,
            number,
            taken_at: Instant::now(),
        }
    }
}

/// Where a snapshot ends up: a local file or a remote endpoint.
pub trait CaptureSink: Send {
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), CaptureError>;

    /// Short human-readable target, for log lines.
    fn describe(&self) -> String;
}
