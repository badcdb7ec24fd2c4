//! Run configuration.

use std::path::PathBuf;
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_DAY_THRESHOLD: f64 = 130.0;
pub const DEFAULT_EVENING_THRESHOLD: f64 = 70.0;
pub const DEFAULT_NIGHT_THRESHOLD: f64 = 0.0;
pub const DEFAULT_MORNING_THRESHOLD: f64 = 90.0;
pub const DEFAULT_FRAME_STEP: u32 = 5;

/// Brightness cutoffs for the classification cascade.
///
/// `night` is carried for reporting and plotting only. The cascade reaches
/// Night by elimination and never compares against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub day: f64,
    pub evening: f64,
    pub morning: f64,
    pub night: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            day: DEFAULT_DAY_THRESHOLD,
            evening: DEFAULT_EVENING_THRESHOLD,
            morning: DEFAULT_MORNING_THRESHOLD,
            night: DEFAULT_NIGHT_THRESHOLD,
        }
    }
}

impl ThresholdSet {
    /// True when some brightness can land in the Early Morning band,
    /// i.e. the interval (morning, evening] is non-empty.
    pub fn early_morning_reachable(&self) -> bool {
        self.evening > self.morning
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("day", self.day),
            ("evening", self.evening),
            ("morning", self.morning),
            ("night", self.night),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "{name} threshold must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Log threshold orderings that make a band unreachable.
    ///
    /// Thresholds are never reordered here.
    pub fn warn_on_ordering(&self) {
        if self.day <= self.evening {
            warn!(
                day = self.day,
                evening = self.evening,
                "day threshold does not exceed evening threshold; Evening is unreachable"
            );
        }
        if !self.early_morning_reachable() {
            warn!(
                evening = self.evening,
                morning = self.morning,
                "morning threshold is not below evening threshold; Early Morning is unreachable"
            );
        }
    }
}

/// Everything one classification run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub thresholds: ThresholdSet,
    /// Process every Nth source frame.
    pub frame_step: u32,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            thresholds: ThresholdSet::default(),
            frame_step: DEFAULT_FRAME_STEP,
        }
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_frame_step(mut self, frame_step: u32) -> Self {
        self.frame_step = frame_step;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_step == 0 {
            return Err(Error::InvalidConfig("frame step must be at least 1".into()));
        }
        self.thresholds.validate()
    }
}
