//! Classification summary and brightness trend plot.

use std::fmt;
use std::io::Write;
use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::classify::Classification;
use crate::config::ThresholdSet;
use crate::error::{Error, Result};
use crate::series::TimeSeries;

pub const NO_FRAMES_MESSAGE: &str = "No frames processed.";

const PLOT_SIZE: (u32, u32) = (1000, 500);
const DASH_SEGMENTS: usize = 60;
const ORANGE: RGBColor = RGBColor(255, 165, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassCount {
    pub label: Classification,
    pub count: usize,
    pub percentage: f64,
}

/// Per-class counts over a non-empty series.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    total: usize,
    counts: Vec<ClassCount>,
}

impl Summary {
    /// `None` for an empty series, so no percentage is ever divided by zero.
    pub fn from_series(series: &TimeSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let total = series.len();
        let counts = Classification::REPORT_ORDER
            .iter()
            .map(|&label| {
                let count = series.count(label);
                ClassCount {
                    label,
                    count,
                    percentage: count as f64 / total as f64 * 100.0,
                }
            })
            .collect();
        Some(Self { total, counts })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Counts in report order: Early Morning, Day, Evening, Night.
    pub fn counts(&self) -> &[ClassCount] {
        &self.counts
    }

    pub fn get(&self, label: Classification) -> Option<&ClassCount> {
        self.counts.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classification Summary:")?;
        for entry in &self.counts {
            writeln!(
                f,
                "{}: {} frames ({:.2}%)",
                entry.label, entry.count, entry.percentage
            )?;
        }
        Ok(())
    }
}

/// Console text for a finished run.
pub fn render_text(series: &TimeSeries) -> String {
    match Summary::from_series(series) {
        Some(summary) => summary.to_string(),
        None => format!("{NO_FRAMES_MESSAGE}\n"),
    }
}

/// Draw brightness over time with one dashed reference line per threshold.
///
/// Returns `Ok(false)` without touching `path` when the series is empty.
pub fn render_plot(series: &TimeSeries, thresholds: &ThresholdSet, path: &Path) -> Result<bool> {
    if series.is_empty() {
        return Ok(false);
    }

    let references = [
        ("Day Threshold", thresholds.day, YELLOW),
        ("Evening Threshold", thresholds.evening, ORANGE),
        ("Morning Threshold", thresholds.morning, BLUE),
        ("Night Threshold", thresholds.night, BLACK),
    ];

    let (x0, x1) = padded_range(series.times().iter().copied())
        .ok_or_else(|| Error::Plot("elapsed time range is too wide to plot".into()))?;
    let (y0, y1) = padded_range(
        series
            .brightness()
            .iter()
            .copied()
            .chain(references.iter().map(|r| r.1)),
    )
    .ok_or_else(|| Error::Plot("brightness and threshold range is too wide to plot".into()))?;

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Brightness Trend Over Time", ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Brightness")
        .draw()
        .map_err(plot_error)?;

    let trace = ShapeStyle::from(&RGBColor(31, 119, 180)).stroke_width(2);
    chart
        .draw_series(LineSeries::new(series.points(), trace))
        .map_err(plot_error)?
        .label("Brightness")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], trace));

    for (name, level, color) in references {
        let style = ShapeStyle::from(&color).stroke_width(2);
        chart
            .draw_series(
                dashes(x0, x1, level)
                    .into_iter()
                    .map(move |segment| PathElement::new(segment, style)),
            )
            .map_err(plot_error)?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 8, y), (x + 12, y), (x + 20, y)], style)
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    info!(path = %path.display(), "wrote brightness plot");
    Ok(true)
}

/// Every other piece of a horizontal line split into equal segments.
fn dashes(x0: f64, x1: f64, y: f64) -> Vec<Vec<(f64, f64)>> {
    let width = (x1 - x0) / DASH_SEGMENTS as f64;
    (0..DASH_SEGMENTS)
        .step_by(2)
        .map(|i| {
            let start = x0 + width * i as f64;
            vec![(start, y), (start + width, y)]
        })
        .collect()
}

/// Axis bounds covering `values` with a 5% margin.
///
/// `None` when the padded bounds or their span leave the finite range;
/// plotters does not terminate on such an axis.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return Some((0.0, 1.0));
    }
    // halved before subtracting so the span of two extreme values cannot overflow
    let pad = ((hi * 0.5 - lo * 0.5) * 0.1).max(0.5);
    let (lo, hi) = (lo - pad, hi + pad);
    if lo.is_finite() && hi.is_finite() && (hi - lo).is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

/// Print the console report, then draw the plot when `plot` is given.
///
/// The report is written first so a plotting failure never hides the
/// summary of a finished run.
pub fn publish(
    series: &TimeSeries,
    thresholds: &ThresholdSet,
    plot: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    out.write_all(render_text(series).as_bytes())?;
    out.flush()?;
    if let Some(path) = plot {
        render_plot(series, thresholds, path)?;
    }
    Ok(())
}

fn plot_error(e: impl fmt::Display) -> Error {
    Error::Plot(e.to_string())
}
