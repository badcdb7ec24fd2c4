//! Video I/O seam used by the pipeline.
//!
//! Decoding and encoding live behind [`VideoBackend`] so the pipeline only
//! ever sees "next frame" and "write frame". [`crate::ffmpeg::FfmpegBackend`]
//! is the production implementation.

use std::path::Path;

use crate::error::Result;
use crate::frame::{ChannelOrder, Frame};

/// Stream properties reported by a source once it is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second as reported by the container.
    pub fps: f64,
    /// Channel order of the frames the source yields.
    pub order: ChannelOrder,
}

impl VideoInfo {
    /// Frame rate truncated to whole frames per second.
    pub fn whole_fps(&self) -> u32 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps.floor() as u32
        } else {
            0
        }
    }
}

/// How the output sink should be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub order: ChannelOrder,
}

pub trait FrameSource {
    fn info(&self) -> &VideoInfo;

    /// The next decoded frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying decoder. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output. Calling it again is a no-op.
    fn finish(&mut self) -> Result<()>;

    fn frames_written(&self) -> u64;
}

/// Opens sources and sinks for a run.
pub trait VideoBackend {
    type Source: FrameSource;
    type Sink: FrameSink;

    fn open_source(&self, path: &Path) -> Result<Self::Source>;

    fn open_sink(&self, path: &Path, spec: &SinkSpec) -> Result<Self::Sink>;
}
