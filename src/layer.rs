// src/layer.rs

//! Positioned drawable units and the ordered stack that flattens them.
//!
//! A `Layer` is a closed set of kinds, matched exhaustively: an embedded
//! raster, or a text string rendered through a `FontDriver`. Offsets are
//! relative to the owning stack's canvas origin and may be negative.

pub mod stack;

pub use stack::LayerStack;

use crate::color::Color;
use crate::font_driver::FontDriver;
use crate::raster::Raster;
use log::warn;

/// A layer that owns its pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterLayer {
    pub offset_x: isize,
    pub offset_y: isize,
    pub raster: Raster,
    /// Free-form label; empty when unset.
    pub caption: String,
}

/// A string drawn through the font collaborator at draw time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayer {
    pub offset_x: isize,
    pub offset_y: isize,
    pub text: String,
    pub font_name: String,
    pub font_size: u32,
    pub color: Color,
}

impl TextLayer {
    /// Rasterizes and tints the text; `None` (with a warning) when the driver fails.
    pub fn render(&self, fonts: &dyn FontDriver) -> Option<Raster> {
        match fonts.rasterize(&self.text, &self.font_name, self.font_size) {
            Ok(coverage) => {
                let color = self.color;
                Some(coverage.map(|c| {
                    let alpha = (color.a as u32 * c.a as u32 + 127) / 255;
                    color.with_alpha(alpha as u8)
                }))
            }
            Err(e) => {
                warn!(
                    "Failed to rasterize text layer {:?} ({} {}px): {:#}",
                    self.text, self.font_name, self.font_size, e
                );
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Raster(RasterLayer),
    Text(TextLayer),
}

impl Layer {
    /// A raster layer at the origin with no caption.
    pub fn raster(raster: Raster) -> Layer {
        Layer::Raster(RasterLayer {
            offset_x: 0,
            offset_y: 0,
            raster,
            caption: String::new(),
        })
    }

    pub fn text(text: impl Into<String>, font_name: impl Into<String>, font_size: u32, color: Color) -> Layer {
        Layer::Text(TextLayer {
            offset_x: 0,
            offset_y: 0,
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            color,
        })
    }

    /// Builder-style offset.
    pub fn at(mut self, x: isize, y: isize) -> Layer {
        self.set_offset(x, y);
        self
    }

    pub fn offset(&self) -> (isize, isize) {
        match self {
            Layer::Raster(l) => (l.offset_x, l.offset_y),
            Layer::Text(l) => (l.offset_x, l.offset_y),
        }
    }

    pub fn set_offset(&mut self, x: isize, y: isize) {
        match self {
            Layer::Raster(l) => {
                l.offset_x = x;
                l.offset_y = y;
            }
            Layer::Text(l) => {
                l.offset_x = x;
                l.offset_y = y;
            }
        }
    }

    /// Natural extent: the raster's size, or the text's rendered box.
    pub fn size(&self, fonts: &dyn FontDriver) -> (usize, usize) {
        match self {
            Layer::Raster(l) => l.raster.dimensions(),
            Layer::Text(l) => fonts.measure(&l.text, &l.font_name, l.font_size),
        }
    }

    pub fn width(&self, fonts: &dyn FontDriver) -> usize {
        self.size(fonts).0
    }

    pub fn height(&self, fonts: &dyn FontDriver) -> usize {
        self.size(fonts).1
    }

    /// The raster of a raster layer at `(0, 0)` sized exactly `width x height`.
    pub(crate) fn as_canvas_raster(&self, width: usize, height: usize) -> Option<&Raster> {
        match self {
            Layer::Raster(l)
                if (l.offset_x, l.offset_y) == (0, 0) && l.raster.dimensions() == (width, height) =>
            {
                Some(&l.raster)
            }
            _ => None,
        }
    }

    /// Alpha-composites this layer onto `target` at its offset. Cells outside
    /// `target` are ignored.
    pub fn draw_onto(&self, target: &mut Raster, fonts: &dyn FontDriver) {
        match self {
            Layer::Raster(l) => target.draw_image_blended(&l.raster, l.offset_x, l.offset_y),
            Layer::Text(l) => {
                if let Some(rendered) = l.render(fonts) {
                    target.draw_image_blended(&rendered, l.offset_x, l.offset_y);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
