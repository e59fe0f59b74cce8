use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// The video could not be opened at all. Aborts a whole batch.
#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("cannot open video {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },
    #[error("no video stream in {path}")]
    NoVideoStream { path: PathBuf },
    #[error("cannot set up decoder: {source}")]
    Decoder {
        #[source]
        source: BoxedError,
    },
}

/// A single read failed. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("frame source is not open")]
    NotOpen,
    #[error("timestamp {timestamp:.3}s is outside the video")]
    OutOfRange { timestamp: f64 },
    #[error("decoding failed at {timestamp:.3}s: {source}")]
    Decoder {
        timestamp: f64,
        #[source]
        source: BoxedError,
    },
    #[error("stream ended before {timestamp:.3}s")]
    EndOfStream { timestamp: f64 },
}

/// Random-access frame reads from a video.
///
/// One handle is owned by one batch at a time; callers must `close` it on
/// every exit path.
pub trait FrameSource: Send {
    /// Opens the video and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, FrameSourceError>;

    /// Decodes the frame shown at `timestamp` seconds.
    fn read_at(&mut self, timestamp: f64) -> Result<Frame, DecodeFailure>;

    /// Releases the underlying handle. Idempotent.
    fn close(&mut self);
}

/// Closes the wrapped source when dropped, so early returns and panics
/// still release the video handle.
pub struct FrameSourceGuard<'a> {
    source: &'a mut dyn FrameSource,
}

impl<'a> FrameSourceGuard<'a> {
    pub fn new(source: &'a mut dyn FrameSource) -> Self {
        Self { source }
    }
}

impl<'a> std::ops::Deref for FrameSourceGuard<'a> {
    type Target = dyn FrameSource + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.source
    }
}

impl<'a> std::ops::DerefMut for FrameSourceGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.source
    }
}

impl Drop for FrameSourceGuard<'_> {
    fn drop(&mut self) {
        self.source.close();
    }
}
