//! ffmpeg-backed frame source and sink.
//!
//! Both sides run ffmpeg as a child process through `ffmpeg-sidecar`:
//! decoding reads raw bgr24 frames from its stdout, encoding feeds raw
//! frames into its stdin.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ChildStdin;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use ffmpeg_sidecar::iter::FfmpegIterator;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frame::{ChannelOrder, Frame};
use crate::video::{FrameSink, FrameSource, SinkSpec, VideoBackend, VideoInfo};

/// Codec for the annotated output, stored with the `mp4v` tag.
pub const OUTPUT_CODEC: &str = "mpeg4";
pub const OUTPUT_TAG: &str = "mp4v";

#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend {
    order: ChannelOrder,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoBackend for FfmpegBackend {
    type Source = FfmpegSource;
    type Sink = FfmpegSink;

    fn open_source(&self, path: &Path) -> Result<FfmpegSource> {
        FfmpegSource::open(path, self.order)
    }

    fn open_sink(&self, path: &Path, spec: &SinkSpec) -> Result<FfmpegSink> {
        FfmpegSink::create(path, spec)
    }
}

pub struct FfmpegSource {
    path: PathBuf,
    child: Option<FfmpegChild>,
    events: FfmpegIterator,
    info: VideoInfo,
    order: ChannelOrder,
    errors: Vec<String>,
}

impl FfmpegSource {
    pub fn open(path: &Path, order: ChannelOrder) -> Result<Self> {
        if !path.exists() {
            return Err(Error::source_unavailable(path, "file not found"));
        }

        let input = path.to_string_lossy();
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .input(input.as_ref())
            .format("rawvideo")
            .pix_fmt(order.pix_fmt())
            .output("-");

        let mut child = command
            .spawn()
            .map_err(|e| Error::source_unavailable(path, format!("failed to spawn ffmpeg: {e}")))?;
        let mut events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::source_unavailable(path, e.to_string()));
            }
        };

        // stream metadata is logged on stderr before the first frame arrives
        let mut errors = Vec::new();
        let mut info = None;
        for event in events.by_ref() {
            match event {
                FfmpegEvent::ParsedInputStream(stream) => {
                    if let Some(video) = stream.video_data() {
                        info = Some(VideoInfo {
                            width: video.width,
                            height: video.height,
                            fps: f64::from(video.fps),
                            order,
                        });
                        break;
                    }
                }
                FfmpegEvent::Error(message) => errors.push(message),
                FfmpegEvent::Done => break,
                _ => {}
            }
        }

        let Some(info) = info else {
            let _ = child.kill();
            let _ = child.wait();
            let reason = errors
                .last()
                .cloned()
                .unwrap_or_else(|| "no video stream found".to_string());
            return Err(Error::source_unavailable(path, reason));
        };

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "opened video source"
        );

        Ok(Self {
            path: path.to_path_buf(),
            child: Some(child),
            events,
            info,
            order,
            errors,
        })
    }

    fn exhausted(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait()?;
        if status.success() {
            return Ok(());
        }
        let reason = self
            .errors
            .last()
            .cloned()
            .unwrap_or_else(|| format!("ffmpeg exited with {status}"));
        Err(Error::source_unavailable(&self.path, reason))
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.child.is_none() {
            return Ok(None);
        }
        while let Some(event) = self.events.next() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    return Ok(Some(Frame::from_raw(
                        frame.width,
                        frame.height,
                        self.order,
                        frame.data,
                    )));
                }
                FfmpegEvent::Error(message) => {
                    warn!(path = %self.path.display(), "ffmpeg: {}", message);
                    self.errors.push(message);
                }
                FfmpegEvent::Done => break,
                _ => {}
            }
        }
        self.exhausted()?;
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            // stopping early: the decoder may still be producing frames
            let _ = child.kill();
            child.wait()?;
        }
        Ok(())
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

pub struct FfmpegSink {
    path: PathBuf,
    child: Option<FfmpegChild>,
    stdin: Option<ChildStdin>,
    frame_len: usize,
    written: u64,
}

impl FfmpegSink {
    pub fn create(path: &Path, spec: &SinkSpec) -> Result<Self> {
        let dims = format!("{}x{}", spec.width, spec.height);
        let rate = spec.fps.to_string();
        let output = path.to_string_lossy();

        // order matters: everything before input() describes the raw stream
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .args(["-loglevel", "error", "-nostats"])
            .overwrite()
            .format("rawvideo")
            .pix_fmt(spec.order.pix_fmt())
            .args(["-s", dims.as_str(), "-r", rate.as_str()])
            .input("-")
            .args(["-c:v", OUTPUT_CODEC, "-tag:v", OUTPUT_TAG])
            .output(output.as_ref());

        let mut child = command
            .spawn()
            .map_err(|e| Error::sink_write(format!("failed to spawn ffmpeg encoder: {e}")))?;
        let Some(stdin) = child.take_stdin() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::sink_write("ffmpeg encoder stdin unavailable"));
        };

        debug!(path = %path.display(), size = %dims, fps = spec.fps, "opened video sink");

        Ok(Self {
            path: path.to_path_buf(),
            child: Some(child),
            stdin: Some(stdin),
            frame_len: spec.width as usize * spec.height as usize * 3,
            written: 0,
        })
    }

    /// Close stdin, wait for the encoder and collect its stderr.
    fn close(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.take_stderr() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        let status = child.wait()?;
        if status.success() {
            return Ok(());
        }
        if self.written == 0 {
            // nothing to encode; ffmpeg may reject an empty raw stream
            debug!(path = %self.path.display(), %status, "encoder exited without frames");
            return Ok(());
        }
        Err(Error::sink_write(format!(
            "{}: ffmpeg exited with {status}: {}",
            self.path.display(),
            stderr.trim()
        )))
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.data().len() != self.frame_len {
            return Err(Error::sink_write(format!(
                "frame is {} bytes, encoder expects {}",
                frame.data().len(),
                self.frame_len
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(Error::sink_write("video sink already closed"));
        };
        if let Err(e) = stdin.write_all(frame.data()) {
            let detail = match self.close() {
                Err(close_err) => close_err.to_string(),
                Ok(()) => e.to_string(),
            };
            return Err(Error::sink_write(detail));
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let flushed = match self.stdin.as_mut().map(|stdin| stdin.flush()) {
            Some(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                Err(Error::sink_write(e.to_string()))
            }
            _ => Ok(()),
        };
        let closed = self.close();
        flushed.and(closed)
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
