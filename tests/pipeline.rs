use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use daypart::{
    report, ChannelOrder, Classification, Error, Frame, FrameSink, FrameSource, Pipeline,
    PipelineConfig, Result, SinkSpec, ThresholdSet, VideoBackend, VideoInfo,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

/// What the fake backend saw, shared with the test after the run.
#[derive(Debug, Default)]
struct Journal {
    sink_spec: Option<SinkSpec>,
    written: Vec<Frame>,
    source_closes: usize,
    sink_finishes: usize,
}

#[derive(Clone)]
enum Item {
    Frame(Frame),
    Fail,
}

struct MemoryBackend {
    fps: f64,
    items: Vec<Item>,
    fail_open: bool,
    fail_source_close: bool,
    /// 1-based index of the write that fails.
    fail_write_at: Option<u64>,
    fail_finish: bool,
    journal: Rc<RefCell<Journal>>,
}

impl MemoryBackend {
    fn new(fps: f64, frames: Vec<Frame>) -> Self {
        Self {
            fps,
            items: frames.into_iter().map(Item::Frame).collect(),
            fail_open: false,
            fail_source_close: false,
            fail_write_at: None,
            fail_finish: false,
            journal: Rc::default(),
        }
    }
}

struct MemorySource {
    info: VideoInfo,
    items: VecDeque<Item>,
    journal: Rc<RefCell<Journal>>,
    closed: bool,
    fail_close: bool,
}

impl FrameSource for MemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.items.pop_front() {
            Some(Item::Frame(frame)) => Ok(Some(frame)),
            Some(Item::Fail) => Err(Error::source_unavailable("memory", "decode failed")),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.journal.borrow_mut().source_closes += 1;
        if self.fail_close {
            return Err(Error::Io(std::io::Error::other("decoder hung up")));
        }
        Ok(())
    }
}

struct MemorySink {
    journal: Rc<RefCell<Journal>>,
    written: u64,
    finished: bool,
    fail_write_at: Option<u64>,
    fail_finish: bool,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_write_at == Some(self.written + 1) {
            return Err(Error::sink_write("disk full"));
        }
        self.journal.borrow_mut().written.push(frame.clone());
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.journal.borrow_mut().sink_finishes += 1;
        if self.fail_finish {
            return Err(Error::sink_write("encoder exited with status 1"));
        }
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}

impl VideoBackend for MemoryBackend {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn open_source(&self, path: &Path) -> Result<MemorySource> {
        if self.fail_open {
            return Err(Error::source_unavailable(path, "no such file"));
        }
        Ok(MemorySource {
            info: VideoInfo {
                width: WIDTH,
                height: HEIGHT,
                fps: self.fps,
                order: ChannelOrder::Bgr,
            },
            items: self.items.iter().cloned().collect(),
            journal: Rc::clone(&self.journal),
            closed: false,
            fail_close: self.fail_source_close,
        })
    }

    fn open_sink(&self, _path: &Path, spec: &SinkSpec) -> Result<MemorySink> {
        self.journal.borrow_mut().sink_spec = Some(*spec);
        Ok(MemorySink {
            journal: Rc::clone(&self.journal),
            written: 0,
            finished: false,
            fail_write_at: self.fail_write_at,
            fail_finish: self.fail_finish,
        })
    }
}

fn gray(level: u8) -> Frame {
    Frame::solid(WIDTH, HEIGHT, ChannelOrder::Bgr, [level, level, level])
}

fn frames(levels: &[u8]) -> Vec<Frame> {
    levels.iter().map(|&l| gray(l)).collect()
}

fn pipeline(step: u32) -> Pipeline {
    Pipeline::new(PipelineConfig::new("in.mp4", "out.mp4").with_frame_step(step)).unwrap()
}

#[test]
fn test_samples_every_nth_frame() {
    let backend = MemoryBackend::new(30.0, frames(&[10; 23]));
    let run = pipeline(5).run(&backend).unwrap();

    assert_eq!(run.frames_read, 23);
    assert_eq!(run.series.len(), 4);
    assert_eq!(run.frames_written, 4);
    for (k, time) in run.series.times().iter().enumerate() {
        let expected = ((k as f64 + 1.0) * 5.0) / 30.0;
        assert!((time - expected).abs() < 1e-12, "sample {k}: {time}");
    }

    let journal = backend.journal.borrow();
    assert_eq!(journal.written.len(), 4);
}

#[test]
fn test_sink_configured_from_source() {
    let backend = MemoryBackend::new(29.97, frames(&[10; 5]));
    let run = pipeline(5).run(&backend).unwrap();

    let spec = backend.journal.borrow().sink_spec.unwrap();
    assert_eq!(spec.width, WIDTH);
    assert_eq!(spec.height, HEIGHT);
    // floor(29.97) / 5
    assert_eq!(spec.fps, 5);
    assert_eq!(run.output_fps, 5);
    // elapsed time uses the truncated rate as well
    assert!((run.series.times()[0] - 5.0 / 29.0).abs() < 1e-12);
}

#[test]
fn test_low_rate_output_clamped_to_one() {
    let backend = MemoryBackend::new(4.0, frames(&[10; 10]));
    let run = pipeline(5).run(&backend).unwrap();
    assert_eq!(run.output_fps, 1);
    assert_eq!(run.series.len(), 2);
}

#[test]
fn test_labels_follow_brightness() {
    let levels = [200, 200, 100, 100, 20, 20];
    let backend = MemoryBackend::new(10.0, frames(&levels));
    let run = pipeline(2).run(&backend).unwrap();

    assert_eq!(
        run.series.labels(),
        &[Classification::Day, Classification::Evening, Classification::Night]
    );
    // measured before the overlay was drawn
    assert!((run.series.brightness()[0] - 200.0).abs() < 1e-9);
    assert!((run.series.brightness()[2] - 20.0).abs() < 1e-9);
}

#[test]
fn test_written_frames_are_annotated() {
    let backend = MemoryBackend::new(10.0, frames(&[200]));
    pipeline(1).run(&backend).unwrap();

    let journal = backend.journal.borrow();
    let out = &journal.written[0];
    assert_eq!(out.rgb_at(32, 32), Some([0, 0, 0]));
    assert_eq!(out.rgb_at(10, 10), Some([200, 200, 200]));
}

#[test]
fn test_short_source_yields_empty_series() {
    let backend = MemoryBackend::new(30.0, frames(&[50; 4]));
    let run = pipeline(5).run(&backend).unwrap();

    assert!(run.series.is_empty());
    assert_eq!(run.frames_written, 0);
    assert_eq!(report::render_text(&run.series), "No frames processed.\n");

    let journal = backend.journal.borrow();
    assert_eq!(journal.source_closes, 1);
    assert_eq!(journal.sink_finishes, 1);
}

#[test]
fn test_zero_length_source() {
    let backend = MemoryBackend::new(30.0, Vec::new());
    let run = pipeline(5).run(&backend).unwrap();
    assert_eq!(run.frames_read, 0);
    assert!(run.series.is_empty());
}

#[test]
fn test_unopenable_source_creates_no_sink() {
    let mut backend = MemoryBackend::new(30.0, frames(&[50; 10]));
    backend.fail_open = true;

    let err = pipeline(5).run(&backend).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(backend.journal.borrow().sink_spec.is_none());
}

#[test]
fn test_zero_fps_source_rejected() {
    let backend = MemoryBackend::new(0.0, frames(&[50; 10]));
    let err = pipeline(5).run(&backend).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(backend.journal.borrow().sink_spec.is_none());
    assert_eq!(backend.journal.borrow().source_closes, 1);
}

#[test]
fn test_invalid_frame_aborts_and_keeps_partial() {
    let mut items = frames(&[200, 200]);
    let rgba = vec![0; WIDTH as usize * HEIGHT as usize * 4];
    items.push(Frame::new(WIDTH, HEIGHT, 4, ChannelOrder::Bgr, rgba));
    items.extend(frames(&[200; 3]));
    let backend = MemoryBackend::new(10.0, items);

    let err = pipeline(1).run(&backend).unwrap_err();
    let partial = err.partial_series().unwrap();
    assert_eq!(partial.len(), 2);
    assert!(matches!(
        err,
        Error::Aborted { ref source, .. } if matches!(**source, Error::InvalidFrame(_))
    ));

    let journal = backend.journal.borrow();
    assert_eq!(journal.written.len(), 2);
    assert_eq!(journal.source_closes, 1);
    assert_eq!(journal.sink_finishes, 1);
}

#[test]
fn test_decode_failure_still_drains() {
    let mut backend = MemoryBackend::new(10.0, frames(&[90; 4]));
    backend.items.insert(2, Item::Fail);

    let err = pipeline(2).run(&backend).unwrap_err();
    assert_eq!(err.partial_series().map(|s| s.len()), Some(1));

    let journal = backend.journal.borrow();
    assert_eq!(journal.source_closes, 1);
    assert_eq!(journal.sink_finishes, 1);
}

#[test]
fn test_runs_are_repeatable() {
    let levels: Vec<u8> = (0..40).map(|i| (i * 6) as u8).collect();
    let backend = MemoryBackend::new(25.0, frames(&levels));
    let pipeline = pipeline(3);

    let first = pipeline.run(&backend).unwrap();
    let second = pipeline.run(&backend).unwrap();
    assert_eq!(first.series, second.series);
    assert_eq!(
        report::Summary::from_series(&first.series),
        report::Summary::from_series(&second.series)
    );
}

#[test]
fn test_custom_thresholds_reach_early_morning() {
    let thresholds = ThresholdSet {
        day: 130.0,
        evening: 70.0,
        morning: 40.0,
        night: 0.0,
    };
    let config = PipelineConfig::new("in.mp4", "out.mp4")
        .with_thresholds(thresholds)
        .with_frame_step(1);
    let backend = MemoryBackend::new(10.0, frames(&[55, 150, 10, 60]));
    let run = Pipeline::new(config).unwrap().run(&backend).unwrap();

    let summary = report::Summary::from_series(&run.series).unwrap();
    assert_eq!(summary.get(Classification::EarlyMorning).unwrap().count, 2);
    assert_eq!(summary.get(Classification::Day).unwrap().count, 1);
    assert_eq!(summary.get(Classification::Night).unwrap().count, 1);
    let total: f64 = summary.counts().iter().map(|c| c.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn test_zero_step_rejected() {
    let config = PipelineConfig::new("in.mp4", "out.mp4").with_frame_step(0);
    assert!(matches!(Pipeline::new(config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_sink_failure_aborts_and_drains() {
    let mut backend = MemoryBackend::new(10.0, frames(&[200, 100, 20, 200, 200, 200]));
    backend.fail_write_at = Some(3);

    let err = pipeline(1).run(&backend).unwrap_err();
    assert!(matches!(
        err,
        Error::Aborted { ref source, .. } if matches!(**source, Error::SinkWrite(_))
    ));

    // the failed frame was measured and recorded before the write
    let partial = err.partial_series().unwrap();
    assert_eq!(partial.len(), 3);
    assert_eq!(partial.labels().last(), Some(&Classification::Night));

    let journal = backend.journal.borrow();
    assert_eq!(journal.written.len(), 2);
    assert_eq!(journal.source_closes, 1);
    assert_eq!(journal.sink_finishes, 1);
}

#[test]
fn test_streaming_error_wins_over_finish_error() {
    let mut backend = MemoryBackend::new(10.0, frames(&[90; 4]));
    backend.items.insert(2, Item::Fail);
    backend.fail_finish = true;

    let err = pipeline(1).run(&backend).unwrap_err();
    assert!(matches!(
        err,
        Error::Aborted { ref source, .. } if matches!(**source, Error::SourceUnavailable { .. })
    ));
    assert_eq!(err.partial_series().map(|s| s.len()), Some(2));
    assert_eq!(backend.journal.borrow().sink_finishes, 1);
}

#[test]
fn test_finish_error_alone_aborts() {
    let mut backend = MemoryBackend::new(10.0, frames(&[90; 4]));
    backend.fail_finish = true;

    let err = pipeline(2).run(&backend).unwrap_err();
    assert!(matches!(
        err,
        Error::Aborted { ref source, .. } if matches!(**source, Error::SinkWrite(_))
    ));
    assert_eq!(err.partial_series().map(|s| s.len()), Some(2));
}

#[test]
fn test_zero_fps_error_survives_close_failure() {
    let mut backend = MemoryBackend::new(0.0, frames(&[50; 10]));
    backend.fail_source_close = true;

    let err = pipeline(5).run(&backend).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert_eq!(backend.journal.borrow().source_closes, 1);
}
