use rayon::prelude::*;

use fractoscope_core::{transform, GenerationParams, ScreenPos, Viewport};

use crate::escape;
use crate::palette::Palette;

/// A square RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub size: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new buffer filled with black (opaque).
    pub fn new(size: u32) -> Self {
        let mut pixels = vec![0u8; size as usize * size as usize * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self { size, pixels }
    }

    pub fn pixel_count(&self) -> usize {
        self.size as usize * self.size as usize
    }

    /// RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let i = (y as usize * self.size as usize + x as usize) * 4;
        let px = &self.pixels[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Compute every pixel of the viewport, one row per rayon task.
    ///
    /// Pixels are sampled at their top-left corner, matching the coordinate
    /// transform the gesture code uses.
    pub fn paint(&mut self, viewport: &Viewport, params: &GenerationParams, palette: &Palette) {
        let size = self.size;
        let canvas = size as f64;
        self.pixels
            .par_chunks_mut(size as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let point = transform::screen_to_plane(
                        ScreenPos::new(x as f64, y as f64),
                        viewport,
                        canvas,
                    );
                    px.copy_from_slice(&palette.color(escape::sample(params, point)));
                }
            });
    }

    /// Drop the alpha channel.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}
