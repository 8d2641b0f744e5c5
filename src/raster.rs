// src/raster.rs

//! The `Raster` pixel buffer: a dense, row-major grid of `Color` values with a
//! top-left origin.
//!
//! Operations are split by concern into submodules, all as inherent methods on
//! `Raster`:
//!
//! ```text
//! draw      lines, rectangles, diamonds, triangle-union area fill
//! filter    per-pixel filters, channel arithmetic, edge maps, histograms
//! geometry  nearest/bilinear resampling, margins, rotation
//! compose   image-on-image drawing and blend modes
//! ```
//!
//! Two accessor families exist. `get`/`put` take signed coordinates and
//! quietly ignore anything out of range. `pixel`/`set_pixel` take unsigned
//! coordinates, expect the caller to have validated them, and panic like slice
//! indexing when they haven't.

pub mod compose;
pub mod draw;
pub mod filter;
pub mod geometry;

pub use compose::BlendMode;
pub use draw::{ClipBox, LineStyle};
pub use filter::{ChannelBase, ChannelEdit, Channels, Histogram, Neighborhood};

use crate::color::Color;
use anyhow::{bail, Result};

/// A width x height grid of colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Raster {
    /// Fully transparent raster.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Wraps existing row-major pixel data.
    ///
    /// # Panics
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixel count does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Builds a raster from packed R,G,B,A bytes.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height * 4 {
            bail!(
                "expected {} RGBA bytes for {}x{}, got {}",
                width * height * 4,
                width,
                height,
                bytes.len()
            );
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Color::new(px[0], px[1], px[2], px[3]))
            .collect();
        Ok(Self::from_pixels(width, height, pixels))
    }

    /// Packed R,G,B,A bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({}, {}) out of range", x, y);
        y * self.width + x
    }

    /// Unchecked read; the caller guarantees `x < width && y < height`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Unchecked write; the caller guarantees `x < width && y < height`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Bounds-checked read.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Option<Color> {
        if self.contains(x, y) {
            Some(self.pixel(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Bounds-checked write; out-of-range coordinates are ignored.
    #[inline]
    pub fn put(&mut self, x: isize, y: isize, color: Color) {
        if self.contains(x, y) {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Applies `f` to every pixel in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(Color) -> Color) {
        for px in self.pixels.iter_mut() {
            *px = f(*px);
        }
    }

    /// Returns a new raster of the same size with `f` applied to every pixel.
    pub fn map(&self, f: impl FnMut(Color) -> Color) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().copied().map(f).collect(),
        }
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[Color] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }
}
