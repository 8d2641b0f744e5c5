// src/font_driver.rs

//! Glyph rasterization collaborator.
//!
//! The engine never shapes text itself. A text layer asks a `FontDriver` how
//! big its string is and for a coverage raster of it, then tints and places
//! that raster. Platform drivers (Core Text, FreeType, ...) live outside this
//! crate; `HeadlessFontDriver` is a deterministic stand-in used by the CLI and
//! the tests.

use crate::color::Color;
use crate::config::TextConfig;
use crate::raster::Raster;
use anyhow::{bail, Result};

/// Measures and rasterizes strings.
pub trait FontDriver {
    /// Size in pixels of the box `text` occupies at `size_px`.
    fn measure(&self, text: &str, font_name: &str, size_px: u32) -> (usize, usize);

    /// Rasterize `text` as coverage.
    ///
    /// # Returns
    /// A raster exactly `measure(..)` in size with **straight alpha**, rendered
    /// white (255,255,255) on transparent; alpha is the glyph coverage.
    fn rasterize(&self, text: &str, font_name: &str, size_px: u32) -> Result<Raster>;
}

/// Block-glyph driver: every non-whitespace character is a solid cell inset by
/// one pixel. Font names are accepted and ignored.
#[derive(Debug, Clone)]
pub struct HeadlessFontDriver {
    advance_ratio: f32,
    line_spacing: f32,
}

impl Default for HeadlessFontDriver {
    fn default() -> Self {
        Self::new(&TextConfig::default())
    }
}

impl HeadlessFontDriver {
    pub fn new(config: &TextConfig) -> Self {
        Self {
            advance_ratio: config.advance_ratio,
            line_spacing: config.line_spacing,
        }
    }

    fn cell_size(&self, size_px: u32) -> (usize, usize) {
        let advance = ((size_px as f32 * self.advance_ratio).round() as usize).max(1);
        let line = ((size_px as f32 * self.line_spacing).round() as usize).max(1);
        (advance, line)
    }
}

impl FontDriver for HeadlessFontDriver {
    fn measure(&self, text: &str, _font_name: &str, size_px: u32) -> (usize, usize) {
        if text.is_empty() || size_px == 0 {
            return (0, 0);
        }
        let (advance, line) = self.cell_size(size_px);
        let columns = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let rows = text.lines().count().max(1);
        (columns * advance, rows * line)
    }

    fn rasterize(&self, text: &str, font_name: &str, size_px: u32) -> Result<Raster> {
        if size_px == 0 {
            bail!("cannot rasterize {:?} in {:?} at size 0", text, font_name);
        }
        let (width, height) = self.measure(text, font_name, size_px);
        let (advance, line) = self.cell_size(size_px);
        let mut out = Raster::new(width, height);
        let inset: isize = if advance > 2 && line > 2 { 1 } else { 0 };
        for (row, text_line) in text.lines().enumerate() {
            for (col, ch) in text_line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x0 = (col * advance) as isize + inset;
                let y0 = (row * line) as isize + inset;
                let x1 = ((col + 1) * advance) as isize - 1 - inset;
                let y1 = ((row + 1) * line) as isize - 1 - inset;
                out.fill_rect(x0, y0, x1, y1, Color::WHITE);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_headless_measure() {
        let driver = HeadlessFontDriver::default();
        let (advance, line) = driver.cell_size(10);
        assert_eq!(driver.measure("abc", "Any", 10), (3 * advance, line));
        assert_eq!(driver.measure("ab\nabcd", "Any", 10), (4 * advance, 2 * line));
        assert_eq!(driver.measure("", "Any", 10), (0, 0));
    }

    #[test]
    fn test_headless_rasterize_matches_measure() {
        let driver = HeadlessFontDriver::default();
        let raster = driver.rasterize("a b", "Any", 10).unwrap();
        assert_eq!(raster.dimensions(), driver.measure("a b", "Any", 10));
        let (advance, line) = driver.cell_size(10);
        // Glyph cell interior is covered, the space is not.
        assert_eq!(raster.pixel(advance / 2, line / 2), Color::WHITE);
        assert_eq!(raster.pixel(advance + advance / 2, line / 2), Color::TRANSPARENT);
        assert_eq!(raster.pixel(0, 0), Color::TRANSPARENT, "Inset border");
    }

    #[test]
    fn test_headless_zero_size_fails() {
        assert!(HeadlessFontDriver::default().rasterize("x", "Any", 0).is_err());
    }
}
