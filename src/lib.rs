//! Time-of-day classification of video by frame brightness.
//!
//! A run samples every Nth frame of a video and measures its mean luma. It
//! buckets the frame as Day, Evening, Early Morning or Night, stamps the
//! label onto the frame and writes the frame to an annotated copy. The
//! samples are returned as a [`TimeSeries`] for reporting.

pub mod annotate;
pub mod brightness;
pub mod classify;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod video;

pub use classify::{classify, Classification};
pub use config::{PipelineConfig, ThresholdSet};
pub use error::{Error, Result};
pub use ffmpeg::FfmpegBackend;
pub use frame::{ChannelOrder, Frame};
pub use pipeline::{Pipeline, RunReport};
pub use report::Summary;
pub use series::TimeSeries;
pub use video::{FrameSink, FrameSource, SinkSpec, VideoBackend, VideoInfo};
