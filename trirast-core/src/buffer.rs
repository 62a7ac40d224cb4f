/// Color and depth buffers owned by the rasterizer.
///
/// Both are row-major with row 0 at the top of the image.
use nalgebra::Vector3;

use crate::numerics::clamp;

/// Per-pixel colors, channels in 0–255.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vector3<f32>>,
}

impl FrameBuffer {
    pub(crate) fn new(width: u32, height: u32, fill: Vector3<f32>) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vector3<f32>] {
        &self.pixels
    }

    /// Color at (x, y), or None if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Vector3<f32>> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub(crate) fn fill(&mut self, color: Vector3<f32>) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    pub(crate) fn set(&mut self, index: usize, color: Vector3<f32>) {
        self.pixels[index] = color;
    }

    /// Convert to tightly packed 8-bit RGB, one byte per channel in R, G, B
    /// order. See [`rgb8`].
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&rgb8(pixel));
        }
        bytes
    }
}

/// One color as 8-bit RGB. Channels are rounded and clamped to 0–255;
/// NaN becomes 0.
pub fn rgb8(color: &Vector3<f32>) -> [u8; 3] {
    let channel = |c: f32| {
        let value = if c.is_nan() { 0.0 } else { clamp(0.0, 255.0, c.round()) };
        value as u8
    };
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Closest depth written so far at each pixel; +∞ means nothing yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthBuffer {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![f32::INFINITY; width as usize * height as usize],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub(crate) fn reset(&mut self) {
        self.values.iter_mut().for_each(|d| *d = f32::INFINITY);
    }

    /// Store `depth` at `index` if it is strictly nearer than what is there.
    #[inline]
    pub(crate) fn test_and_set(&mut self, index: usize, depth: f32) -> bool {
        if depth < self.values[index] {
            self.values[index] = depth;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb8_rounds_and_clamps() {
        let mut frame = FrameBuffer::new(2, 1, Vector3::zeros());
        frame.set(0, Vector3::new(254.6, -3.0, 300.0));
        frame.set(1, Vector3::new(f32::NAN, 0.4, 127.5));
        assert_eq!(frame.to_rgb8(), vec![255, 0, 255, 0, 0, 128]);
    }

    #[test]
    fn test_rgb8_single_color() {
        assert_eq!(rgb8(&Vector3::new(0.49, 255.4, 17.5)), [0, 255, 18]);
        assert_eq!(rgb8(&Vector3::new(f32::INFINITY, f32::NEG_INFINITY, f32::NAN)), [255, 0, 0]);
    }

    #[test]
    fn test_get_bounds() {
        let frame = FrameBuffer::new(3, 2, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(frame.get(2, 1), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(frame.get(3, 0), None);
        assert_eq!(frame.get(0, 2), None);
    }

    #[test]
    fn test_depth_keeps_minimum() {
        let mut depth = DepthBuffer::new(1, 1);
        assert!(depth.test_and_set(0, 0.5));
        assert!(!depth.test_and_set(0, 0.7));
        assert!(!depth.test_and_set(0, 0.5));
        assert!(depth.test_and_set(0, -0.2));
        assert_eq!(depth.get(0, 0), Some(-0.2));

        depth.reset();
        assert_eq!(depth.get(0, 0), Some(f32::INFINITY));
    }
}
