use crate::error::Result;
use crate::frame::Frame;

const RED_WEIGHT: f64 = 0.299;
const GREEN_WEIGHT: f64 = 0.587;
const BLUE_WEIGHT: f64 = 0.114;

/// Mean luma of all pixels in a frame, e.g. all 2073600 pixels in a 1080p frame.
///
/// Weights are applied by channel meaning, not position, so a BGR and an RGB
/// frame of the same picture measure the same.
pub fn estimate(frame: &Frame) -> Result<f64> {
    frame.ensure_packed_rgb()?;
    let (r, g, b) = frame.order().rgb_offsets();

    let sum: f64 = frame
        .data()
        .chunks_exact(3)
        .map(|px| {
            RED_WEIGHT * px[r] as f64 + GREEN_WEIGHT * px[g] as f64 + BLUE_WEIGHT * px[b] as f64
        })
        .sum();

    Ok(sum / frame.pixel_count() as f64)
}
