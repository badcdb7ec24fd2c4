//! Decoded video frames.

use crate::error::{Error, Result};

/// Memory order of the three colour channels in a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Blue, green, red. What the decoder is asked to produce.
    #[default]
    Bgr,
    Rgb,
}

impl ChannelOrder {
    /// Byte offsets of (red, green, blue) within one pixel.
    pub fn rgb_offsets(self) -> (usize, usize, usize) {
        match self {
            ChannelOrder::Bgr => (2, 1, 0),
            ChannelOrder::Rgb => (0, 1, 2),
        }
    }

    /// Name of the matching ffmpeg rawvideo pixel format.
    pub fn pix_fmt(self) -> &'static str {
        match self {
            ChannelOrder::Bgr => "bgr24",
            ChannelOrder::Rgb => "rgb24",
        }
    }
}

/// A packed, interleaved 8-bit frame.
///
/// `channels` is carried separately from `order` so a decoder handing back
/// the wrong layout is caught when the frame is measured instead of being
/// silently misread.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: usize,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        order: ChannelOrder,
        data: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            channels,
            order,
            data,
        }
    }

    /// Build a frame from a raw buffer, inferring the channel count from its length.
    pub fn from_raw(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Self {
        let pixels = width as usize * height as usize;
        let channels = if pixels == 0 { 0 } else { data.len() / pixels };
        Self::new(width, height, channels, order, data)
    }

    /// A frame where every pixel has the same (r, g, b) value.
    pub fn solid(width: u32, height: u32, order: ChannelOrder, rgb: [u8; 3]) -> Self {
        let (r, g, b) = order.rgb_offsets();
        let mut pixel = [0u8; 3];
        pixel[r] = rgb[0];
        pixel[g] = rgb[1];
        pixel[b] = rgb[2];
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, 3, order, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the buffer is a well-formed three channel image.
    pub fn ensure_packed_rgb(&self) -> Result<()> {
        if self.channels != 3 {
            return Err(Error::invalid_frame(format!(
                "expected 3 channels, got {}",
                self.channels
            )));
        }
        if self.pixel_count() == 0 {
            return Err(Error::invalid_frame("frame has no pixels"));
        }
        let expected = self.pixel_count() * 3;
        if self.data.len() != expected {
            return Err(Error::invalid_frame(format!(
                "{}x{} frame needs {} bytes, buffer holds {}",
                self.width,
                self.height,
                expected,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Colour of the pixel at (x, y) as (r, g, b), or `None` when out of bounds.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height || self.channels != 3 {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.data.get(idx..idx + 3)?;
        let (r, g, b) = self.order.rgb_offsets();
        Some([px[r], px[g], px[b]])
    }

    /// Set the pixel at (x, y). Writes outside the frame are ignored.
    pub fn put_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height || self.channels != 3 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let (r, g, b) = self.order.rgb_offsets();
        if let Some(px) = self.data.get_mut(idx..idx + 3) {
            px[r] = rgb[0];
            px[g] = rgb[1];
            px[b] = rgb[2];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_respects_channel_order() {
        let bgr = Frame::solid(1, 1, ChannelOrder::Bgr, [10, 20, 30]);
        assert_eq!(bgr.data(), &[30, 20, 10]);

        let rgb = Frame::solid(1, 1, ChannelOrder::Rgb, [10, 20, 30]);
        assert_eq!(rgb.data(), &[10, 20, 30]);
        assert_eq!(rgb.rgb_at(0, 0), bgr.rgb_at(0, 0));
    }

    #[test]
    fn test_from_raw_infers_channels() {
        let frame = Frame::from_raw(2, 2, ChannelOrder::Bgr, vec![0; 16]);
        assert_eq!(frame.channels(), 4);
        assert!(matches!(frame.ensure_packed_rgb(), Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = Frame::new(2, 2, 3, ChannelOrder::Bgr, vec![0; 11]);
        assert!(frame.ensure_packed_rgb().is_err());
    }

    #[test]
    fn test_put_outside_is_ignored() {
        let mut frame = Frame::solid(2, 2, ChannelOrder::Bgr, [1, 2, 3]);
        let before = frame.clone();
        frame.put_rgb(5, 0, [255, 255, 255]);
        assert_eq!(frame, before);
    }
}
