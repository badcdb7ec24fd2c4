//! Frame sampling, classification and annotated output.

use tracing::{debug, info, warn};

use crate::annotate::annotate;
use crate::brightness;
use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::series::TimeSeries;
use crate::video::{FrameSink, FrameSource, SinkSpec, VideoBackend};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub series: TimeSeries,
    pub frames_read: u64,
    pub frames_written: u64,
    /// Frame rate the output video was opened with.
    pub output_fps: u32,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Classify every `frame_step`th frame of the input and write the
    /// annotated frames to the output.
    ///
    /// Source and sink are released exactly once whether streaming ends
    /// normally or not. A mid-stream failure comes back as
    /// [`Error::Aborted`] carrying the samples recorded so far.
    pub fn run<B: VideoBackend>(&self, backend: &B) -> Result<RunReport> {
        let config = &self.config;
        config.thresholds.warn_on_ordering();

        let mut source = backend.open_source(&config.input)?;
        let info = *source.info();
        let source_fps = info.whole_fps();
        if source_fps == 0 {
            if let Err(e) = source.close() {
                warn!(error = %e, "failed to release video source");
            }
            return Err(Error::source_unavailable(
                &config.input,
                format!("unusable frame rate {}", info.fps),
            ));
        }

        let mut output_fps = source_fps / config.frame_step;
        if output_fps == 0 {
            warn!(
                source_fps,
                frame_step = config.frame_step,
                "sampled frame rate rounds to zero; writing output at 1 fps"
            );
            output_fps = 1;
        }

        let spec = SinkSpec {
            width: info.width,
            height: info.height,
            fps: output_fps,
            order: info.order,
        };
        let mut sink = match backend.open_sink(&config.output, &spec) {
            Ok(sink) => sink,
            Err(e) => {
                if let Err(close_err) = source.close() {
                    warn!(error = %close_err, "failed to release video source");
                }
                return Err(e);
            }
        };

        info!(
            input = %config.input.display(),
            output = %config.output.display(),
            width = info.width,
            height = info.height,
            source_fps,
            output_fps,
            frame_step = config.frame_step,
            "classifying video"
        );

        let mut series = TimeSeries::new();
        let mut frames_read = 0u64;
        let streamed = self.stream(
            &mut source,
            &mut sink,
            source_fps,
            &mut series,
            &mut frames_read,
        );

        // draining: both sides are released before any error is surfaced
        let source_closed = source.close();
        let sink_finished = sink.finish();
        let frames_written = sink.frames_written();

        // the first failure is surfaced; later ones are only logged
        let mut failures = [streamed, source_closed, sink_finished]
            .into_iter()
            .filter_map(|r| r.err());
        if let Some(e) = failures.next() {
            for secondary in failures {
                warn!(error = %secondary, "additional failure while draining");
            }
            return Err(Error::Aborted {
                source: Box::new(e),
                partial: series,
            });
        }

        info!(
            frames_read,
            samples = series.len(),
            frames_written,
            "finished classifying video"
        );

        Ok(RunReport {
            series,
            frames_read,
            frames_written,
            output_fps,
        })
    }

    fn stream<S: FrameSource, K: FrameSink>(
        &self,
        source: &mut S,
        sink: &mut K,
        source_fps: u32,
        series: &mut TimeSeries,
        frames_read: &mut u64,
    ) -> Result<()> {
        let step = u64::from(self.config.frame_step);
        while let Some(frame) = source.next_frame()? {
            *frames_read += 1;
            if *frames_read % step != 0 {
                continue;
            }
            let elapsed = *frames_read as f64 / f64::from(source_fps);
            self.process(frame, elapsed, sink, series)?;
        }
        Ok(())
    }

    /// Measure, classify, record, annotate and write one sampled frame, in that order.
    fn process<K: FrameSink>(
        &self,
        mut frame: Frame,
        elapsed: f64,
        sink: &mut K,
        series: &mut TimeSeries,
    ) -> Result<()> {
        let brightness = brightness::estimate(&frame)?;
        let label = classify(brightness, &self.config.thresholds);
        series.push(elapsed, brightness, label);
        debug!(elapsed, brightness, %label, "sampled frame");

        annotate(&mut frame, label, brightness);
        sink.write_frame(&frame)
    }
}
