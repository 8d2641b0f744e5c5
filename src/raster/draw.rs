// src/raster/draw.rs

//! Drawing primitives: lines, filled rectangles and diamonds, and the
//! triangle-union area fill.

use super::Raster;
use crate::color::Color;
use log::trace;
use std::collections::BTreeSet;

/// Dotted lines draw 3 steps out of every 6 along the dominant axis.
const DOT_PERIOD: isize = 6;
const DOT_ON: isize = 3;

/// Stroke options for `Raster::draw_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    /// 1 is a hairline; 2 paints a 2x2 footprint; 3 or more paints 3x3.
    pub width: u32,
    pub dotted: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            width: 1,
            dotted: false,
        }
    }
}

impl LineStyle {
    pub fn dotted() -> Self {
        LineStyle {
            dotted: true,
            ..Self::default()
        }
    }

    pub fn with_width(self, width: u32) -> Self {
        LineStyle { width, ..self }
    }
}

/// Inclusive `(left, top, right, bottom)` cell box.
pub type ClipBox = (isize, isize, isize, isize);

/// `numerator / denominator` rounded half away from zero; `denominator > 0`.
#[inline]
fn round_div(numerator: isize, denominator: isize) -> isize {
    let twice = numerator * 2;
    if twice >= 0 {
        (twice + denominator) / (denominator * 2)
    } else {
        (twice - denominator) / (denominator * 2)
    }
}

/// y of the edge `from -> to` at column `x`; requires `from.0 <= to.0`.
#[inline]
fn edge_y(from: (isize, isize), to: (isize, isize), x: isize) -> isize {
    if from.0 == to.0 {
        return to.1;
    }
    from.1 + round_div((x - from.0) * (to.1 - from.1), to.0 - from.0)
}

impl Raster {
    fn plot(&mut self, x: isize, y: isize, color: Color, width: u32) {
        match width {
            0 | 1 => self.put(x, y, color),
            2 => {
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    self.put(x + dx, y + dy, color);
                }
            }
            _ => {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        self.put(x + dx, y + dy, color);
                    }
                }
            }
        }
    }

    /// Draws a straight line. Endpoints are clamped to the raster first.
    pub fn draw_line(
        &mut self,
        x0: isize,
        y0: isize,
        x1: isize,
        y1: isize,
        color: Color,
        style: LineStyle,
    ) {
        if self.is_empty() {
            return;
        }
        let max_x = self.width as isize - 1;
        let max_y = self.height as isize - 1;
        let (x0, y0) = (x0.clamp(0, max_x), y0.clamp(0, max_y));
        let (x1, y1) = (x1.clamp(0, max_x), y1.clamp(0, max_y));
        let (dx, dy) = (x1 - x0, y1 - y0);

        if dx == 0 && dy == 0 {
            self.plot(x0, y0, color, style.width);
            return;
        }

        // Step along the dominant axis; the minor coordinate is proportional.
        let horizontal = dx.abs() > dy.abs();
        let (major_len, major_sign) = if horizontal {
            (dx.abs(), dx.signum())
        } else {
            (dy.abs(), dy.signum())
        };
        for step in 0..=major_len {
            if style.dotted && step % DOT_PERIOD >= DOT_ON {
                continue;
            }
            let (x, y) = if horizontal {
                (x0 + step * major_sign, y0 + round_div(step * dy, major_len))
            } else {
                (x0 + round_div(step * dx, major_len), y0 + step * major_sign)
            };
            self.plot(x, y, color, style.width);
        }
    }

    /// Inclusive corner box normalised and clamped to the raster, or `None`
    /// when it misses the raster entirely.
    fn clamp_box(
        &self,
        x0: isize,
        y0: isize,
        x1: isize,
        y1: isize,
    ) -> Option<(usize, usize, usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        let (w, h) = (self.width as isize, self.height as isize);
        if max_x < 0 || max_y < 0 || min_x >= w || min_y >= h {
            return None;
        }
        Some((
            min_x.max(0) as usize,
            min_y.max(0) as usize,
            max_x.min(w - 1) as usize,
            max_y.min(h - 1) as usize,
        ))
    }

    /// Fills the inclusive box between two corners, overwriting.
    pub fn fill_rect(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: Color) {
        if let Some((left, top, right, bottom)) = self.clamp_box(x0, y0, x1, y1) {
            for y in top..=bottom {
                let start = y * self.width;
                self.pixels[start + left..=start + right].fill(color);
            }
        }
    }

    /// Like `fill_rect`, but a translucent `color` is blended over the
    /// existing content instead of replacing it.
    pub fn fill_rect_blended(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: Color) {
        if color.is_opaque() {
            self.fill_rect(x0, y0, x1, y1, color);
            return;
        }
        if let Some((left, top, right, bottom)) = self.clamp_box(x0, y0, x1, y1) {
            for y in top..=bottom {
                for x in left..=right {
                    let under = self.pixel(x, y);
                    self.set_pixel(x, y, color.over(under));
                }
            }
        }
    }

    /// Fills the Manhattan diamond inscribed in the inclusive box.
    ///
    /// Each axis contributes a closeness `1 - |d| / half`, the inverse of its
    /// normalized distance from the midpoint. A cell is filled when the two
    /// closenesses sum to more than 1, which keeps the inside of the diamond
    /// rather than its four corners.
    pub fn fill_diamond(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: Color) {
        let Some((left, top, right, bottom)) = self.clamp_box(x0, y0, x1, y1) else {
            return;
        };
        // Midpoint and half extents come from the unclamped box.
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        let mid_x = (min_x + max_x) as f64 / 2.0;
        let mid_y = (min_y + max_y) as f64 / 2.0;
        let half_w = (max_x - min_x + 1) as f64 / 2.0;
        let half_h = (max_y - min_y + 1) as f64 / 2.0;

        for y in top..=bottom {
            let closeness_y = 1.0 - (y as f64 - mid_y).abs() / half_h;
            for x in left..=right {
                let closeness_x = 1.0 - (x as f64 - mid_x).abs() / half_w;
                if closeness_x + closeness_y > 1.0 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Every cell covered by the triangle `a, b, c`, column by column between
    /// the leftmost and rightmost corner. With `clip` (inclusive
    /// `left, top, right, bottom`) only cells inside the box are produced.
    pub fn triangle_points(
        a: (isize, isize),
        b: (isize, isize),
        c: (isize, isize),
        clip: Option<ClipBox>,
        out: &mut BTreeSet<(isize, isize)>,
    ) {
        let (clip_left, clip_top, clip_right, clip_bottom) =
            clip.unwrap_or((isize::MIN, isize::MIN, isize::MAX, isize::MAX));
        let mut span = |x: isize, y0: isize, y1: isize| {
            let lo = y0.min(y1).max(clip_top);
            let hi = y0.max(y1).min(clip_bottom);
            if lo <= hi {
                out.extend((lo..=hi).map(|y| (x, y)));
            }
        };

        let mut corners = [a, b, c];
        corners.sort_unstable();
        let [left, mid, right] = corners;

        if left.0 == right.0 {
            if (clip_left..=clip_right).contains(&left.0) {
                let lo = left.1.min(mid.1).min(right.1);
                let hi = left.1.max(mid.1).max(right.1);
                span(left.0, lo, hi);
            }
            return;
        }

        for x in left.0.max(clip_left)..=right.0.min(clip_right) {
            let baseline = edge_y(left, right, x);
            let other = if x <= mid.0 {
                edge_y(left, mid, x)
            } else {
                edge_y(mid, right, x)
            };
            span(x, baseline, other);
        }
    }

    /// Union of every triangle formed by any three of `corners`.
    ///
    /// Over-inclusive for non-convex or unordered corner lists, and cubic in
    /// the corner count. Fewer than three corners cover nothing.
    pub fn area_points(corners: &[(isize, isize)]) -> BTreeSet<(isize, isize)> {
        Self::area_points_clipped(corners, None)
    }

    /// `area_points` restricted to `clip`.
    pub fn area_points_clipped(corners: &[(isize, isize)], clip: Option<ClipBox>) -> BTreeSet<(isize, isize)> {
        let mut points = BTreeSet::new();
        let n = corners.len();
        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    Self::triangle_points(corners[i], corners[j], corners[k], clip, &mut points);
                }
            }
        }
        trace!("area_points: {} corners -> {} cells", n, points.len());
        points
    }

    /// Fills the area spanned by `corners`; cells outside the raster are skipped.
    pub fn fill_area(&mut self, corners: &[(isize, isize)], color: Color) {
        if self.is_empty() {
            return;
        }
        let bounds = (0, 0, self.width as isize - 1, self.height as isize - 1);
        for (x, y) in Self::area_points_clipped(corners, Some(bounds)) {
            self.set_pixel(x as usize, y as usize, color);
        }
    }
}
