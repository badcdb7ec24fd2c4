//! Time-of-day classification by brightness.

use std::fmt;

use crate::config::ThresholdSet;

/// Time-of-day bucket for one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Day,
    Evening,
    EarlyMorning,
    Night,
}

impl Classification {
    /// Order used by the summary report.
    pub const REPORT_ORDER: [Classification; 4] = [
        Classification::EarlyMorning,
        Classification::Day,
        Classification::Evening,
        Classification::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Day => "Day",
            Classification::Evening => "Evening",
            Classification::EarlyMorning => "Early Morning",
            Classification::Night => "Night",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First match wins over strict `>` comparisons, day down to morning.
///
/// Threshold ordering is not checked, and NaN falls through to Night.
pub fn classify(brightness: f64, thresholds: &ThresholdSet) -> Classification {
    if brightness > thresholds.day {
        Classification::Day
    } else if brightness > thresholds.evening {
        Classification::Evening
    } else if brightness > thresholds.morning {
        Classification::EarlyMorning
    } else {
        Classification::Night
    }
}
