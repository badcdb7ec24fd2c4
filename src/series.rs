//! Per-sample record of a run.

use crate::classify::Classification;

/// Append-only (elapsed seconds, brightness, label) record, one entry per
/// sampled frame in temporal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    times: Vec<f64>,
    brightness: Vec<f64>,
    labels: Vec<Classification>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, elapsed_secs: f64, brightness: f64, label: Classification) {
        self.times.push(elapsed_secs);
        self.brightness.push(brightness);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn brightness(&self) -> &[f64] {
        &self.brightness
    }

    pub fn labels(&self) -> &[Classification] {
        &self.labels
    }

    /// (time, brightness) points for plotting.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.brightness.iter().copied())
    }

    pub fn count(&self, label: Classification) -> usize {
        self.labels.iter().filter(|l| **l == label).count()
    }
}
