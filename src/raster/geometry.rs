// src/raster/geometry.rs

//! Geometric transforms. Each returns a freshly built raster; the source is
//! never resized in place.

use super::Raster;
use crate::color::Color;
use log::trace;

/// `scale_to` halves the image while it is more than this many times the target.
pub const PRESCALE_RATIO: usize = 3;

/// Fractional source coordinate sampled by destination index `dst`.
#[inline]
fn source_coord(dst: usize, src_len: usize, dst_len: usize) -> f64 {
    let s = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64 - 0.5;
    s.clamp(0.0, (src_len - 1) as f64)
}

impl Raster {
    /// Nearest-neighbor resize: cell `(x, y)` samples `(x*w/new_w, y*h/new_h)`.
    pub fn resize(&self, new_width: usize, new_height: usize) -> Raster {
        if new_width == 0 || new_height == 0 || self.is_empty() {
            return Raster::new(new_width, new_height);
        }
        let mut out = Raster::new(new_width, new_height);
        for y in 0..new_height {
            let sy = y * self.height / new_height;
            for x in 0..new_width {
                let sx = x * self.width / new_width;
                out.set_pixel(x, y, self.pixel(sx, sy));
            }
        }
        out
    }

    fn resample_horizontal(&self, new_width: usize) -> Raster {
        let mut out = Raster::new(new_width, self.height);
        for x in 0..new_width {
            let fx = source_coord(x, self.width, new_width);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(self.width - 1);
            let frac = fx - x0 as f64;
            for y in 0..self.height {
                let mixed = Color::intermix(self.pixel(x1, y), self.pixel(x0, y), frac);
                out.set_pixel(x, y, mixed);
            }
        }
        out
    }

    fn resample_vertical(&self, new_height: usize) -> Raster {
        let mut out = Raster::new(self.width, new_height);
        for y in 0..new_height {
            let fy = source_coord(y, self.height, new_height);
            let y0 = fy.floor() as usize;
            let y1 = (y0 + 1).min(self.height - 1);
            let frac = fy - y0 as f64;
            for x in 0..self.width {
                let mixed = Color::intermix(self.pixel(x, y1), self.pixel(x, y0), frac);
                out.set_pixel(x, y, mixed);
            }
        }
        out
    }

    /// Bilinear resample: a horizontal pass, then a vertical pass over the
    /// intermediate. Same-size requests return an unchanged copy.
    pub fn resample(&self, new_width: usize, new_height: usize) -> Raster {
        if (new_width, new_height) == self.dimensions() {
            return self.clone();
        }
        if new_width == 0 || new_height == 0 || self.is_empty() {
            return Raster::new(new_width, new_height);
        }
        let horizontal = if new_width == self.width {
            self.clone()
        } else {
            self.resample_horizontal(new_width)
        };
        if new_height == self.height {
            horizontal
        } else {
            horizontal.resample_vertical(new_height)
        }
    }

    /// Bilinear resample that first halves the image while it is more than
    /// `PRESCALE_RATIO` times the target, bounding blend error on big downscales.
    pub fn scale_to(&self, new_width: usize, new_height: usize) -> Raster {
        if new_width == 0 || new_height == 0 || self.is_empty() {
            return Raster::new(new_width, new_height);
        }
        let mut current = self.clone();
        loop {
            let (w, h) = current.dimensions();
            let half_w = if w > PRESCALE_RATIO * new_width { w / 2 } else { w };
            let half_h = if h > PRESCALE_RATIO * new_height { h / 2 } else { h };
            if (half_w, half_h) == (w, h) {
                break;
            }
            trace!("scale_to: halving {}x{} -> {}x{}", w, h, half_w, half_h);
            current = current.resample(half_w, half_h);
        }
        current.resample(new_width, new_height)
    }

    /// Crops symmetrically to the target aspect ratio, then scales.
    /// The result is never letterboxed.
    pub fn resample_cropped(&self, new_width: usize, new_height: usize) -> Raster {
        if new_width == 0 || new_height == 0 || self.is_empty() {
            return Raster::new(new_width, new_height);
        }
        let (w, h) = self.dimensions();
        let lhs = w as u128 * new_height as u128;
        let rhs = h as u128 * new_width as u128;
        let cropped = if lhs > rhs {
            let target_w = ((rhs / new_height as u128) as usize).max(1);
            let diff = (w - target_w) as isize;
            let left = diff / 2;
            self.expand_by(0, -(diff - left), 0, -left, Color::TRANSPARENT)
        } else if lhs < rhs {
            let target_h = ((lhs / new_width as u128) as usize).max(1);
            let diff = (h - target_h) as isize;
            let top = diff / 2;
            self.expand_by(-top, 0, -(diff - top), 0, Color::TRANSPARENT)
        } else {
            self.clone()
        };
        cropped.scale_to(new_width, new_height)
    }

    /// Grows (positive) or crops (negative) each side. New cells are `fill`.
    /// A negative resulting extent collapses to zero.
    pub fn expand_by(&self, top: isize, right: isize, bottom: isize, left: isize, fill: Color) -> Raster {
        let new_width = (self.width as isize + left + right).max(0) as usize;
        let new_height = (self.height as isize + top + bottom).max(0) as usize;
        let mut out = Raster::filled(new_width, new_height, fill);
        if out.is_empty() || self.is_empty() {
            return out;
        }

        let dst_x_start = left.max(0);
        let dst_x_end = (self.width as isize + left).min(new_width as isize);
        if dst_x_start >= dst_x_end {
            return out;
        }
        let src_x_start = (dst_x_start - left) as usize;
        let src_x_end = (dst_x_end - left) as usize;
        for ny in 0..new_height {
            let sy = ny as isize - top;
            if sy < 0 || sy >= self.height as isize {
                continue;
            }
            let src = &self.row(sy as usize)[src_x_start..src_x_end];
            let row_start = ny * new_width;
            out.pixels[row_start + dst_x_start as usize..row_start + dst_x_end as usize]
                .copy_from_slice(src);
        }
        out
    }

    /// The `width x height` window whose top-left corner is `(x, y)`.
    pub fn crop(&self, x: isize, y: isize, width: usize, height: usize) -> Raster {
        let right = self.width as isize - x - width as isize;
        let bottom = self.height as isize - y - height as isize;
        self.expand_by(-y, -right, -bottom, -x, Color::TRANSPARENT)
    }

    /// Quarter turn clockwise.
    pub fn rotate_right(&self) -> Raster {
        let (w, h) = self.dimensions();
        let mut out = Raster::new(h, w);
        for ny in 0..w {
            for nx in 0..h {
                out.set_pixel(nx, ny, self.pixel(ny, h - 1 - nx));
            }
        }
        out
    }

    /// Quarter turn counter-clockwise.
    pub fn rotate_left(&self) -> Raster {
        let (w, h) = self.dimensions();
        let mut out = Raster::new(h, w);
        for ny in 0..w {
            for nx in 0..h {
                out.set_pixel(nx, ny, self.pixel(w - 1 - ny, nx));
            }
        }
        out
    }
}
