// src/raster/compose.rs

//! Drawing one raster onto another at an offset.
//!
//! Source cells that land outside the destination are dropped; the
//! destination never changes size.

use super::Raster;
use crate::color::Color;

/// How a source pixel combines with the destination pixel beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite, alpha included.
    Replace,
    /// Overwrite, except source pixels equal to the key color.
    Keyed(Color),
    /// Alpha-composite the source over the destination.
    Over,
    Min,
    Max,
    Multiply,
    /// Even source rows overwrite; odd rows leave the destination alone.
    Interlace,
}

impl BlendMode {
    #[inline]
    fn combine(self, src: Color, dst: Color, src_row: usize) -> Color {
        match self {
            BlendMode::Replace => src,
            BlendMode::Keyed(key) => {
                if src == key {
                    dst
                } else {
                    src
                }
            }
            BlendMode::Over => src.over(dst),
            BlendMode::Min => src.min(dst),
            BlendMode::Max => src.max(dst),
            BlendMode::Multiply => src.multiply(dst),
            BlendMode::Interlace => {
                if src_row % 2 == 0 {
                    src
                } else {
                    dst
                }
            }
        }
    }
}

impl Raster {
    /// Draws `src` with its top-left corner at `(x, y)` using `mode`.
    pub fn draw_image_with(&mut self, src: &Raster, x: isize, y: isize, mode: BlendMode) {
        // Overlap in source coordinates.
        let sx_start = (-x).max(0);
        let sy_start = (-y).max(0);
        let sx_end = (self.width as isize - x).min(src.width as isize);
        let sy_end = (self.height as isize - y).min(src.height as isize);
        if sx_start >= sx_end || sy_start >= sy_end {
            return;
        }
        for sy in sy_start as usize..sy_end as usize {
            let ty = (sy as isize + y) as usize;
            let src_row = src.row(sy);
            let dst_start = ty * self.width;
            for sx in sx_start as usize..sx_end as usize {
                let tx = (sx as isize + x) as usize;
                let dst = &mut self.pixels[dst_start + tx];
                *dst = mode.combine(src_row[sx], *dst, sy);
            }
        }
    }

    /// Opaque copy of `src`, alpha included.
    pub fn draw_image(&mut self, src: &Raster, x: isize, y: isize) {
        self.draw_image_with(src, x, y, BlendMode::Replace);
    }

    /// Copy that treats `key` as transparent.
    pub fn draw_image_keyed(&mut self, src: &Raster, x: isize, y: isize, key: Color) {
        self.draw_image_with(src, x, y, BlendMode::Keyed(key));
    }

    /// Alpha-blended draw.
    pub fn draw_image_blended(&mut self, src: &Raster, x: isize, y: isize) {
        self.draw_image_with(src, x, y, BlendMode::Over);
    }
}
