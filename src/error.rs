//! Error types for the classification run.

use std::path::PathBuf;
use thiserror::Error;

use crate::series::TimeSeries;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying a video.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Video source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Failed to write output video: {0}")]
    SinkWrite(String),

    #[error("Failed to render brightness plot: {0}")]
    Plot(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sampled frame failed mid-stream. Everything recorded before the
    /// failure is kept in `partial`.
    #[error("Run aborted after {} samples: {source}", .partial.len())]
    Aborted {
        #[source]
        source: Box<Error>,
        partial: TimeSeries,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    pub fn sink_write(message: impl Into<String>) -> Self {
        Self::SinkWrite(message.into())
    }

    /// Series recorded before the run failed, if the error carries one.
    pub fn partial_series(&self) -> Option<&TimeSeries> {
        match self {
            Self::Aborted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
