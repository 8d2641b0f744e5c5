// src/raster/filter.rs

//! Per-pixel filters and whole-raster analyses.

use super::Raster;
use crate::color::{BrightnessInversion, Color, Overflow};
use bitflags::bitflags;
use log::debug;

/// A pixel is extreme when its R+G+B sum is above this (near white)...
pub const EXTREME_HIGH_SUM: u32 = 637;
/// ...or below this (near black).
pub const EXTREME_LOW_SUM: u32 = 128;

bitflags! {
    /// A set of channels; as a `ChannelBase` the selected channels are summed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const RGB = Self::R.bits() | Self::G.bits() | Self::B.bits();
        const RGBA = Self::RGB.bits() | Self::A.bits();
    }
}

/// The base value an output channel is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBase {
    /// Sum of the selected input channels (a single channel, or any
    /// pairwise, triple or quadruple sum).
    Sum(Channels),
    Zero,
    One,
}

impl ChannelBase {
    pub fn value(self, color: Color) -> i64 {
        self.value_wide(widen(color))
    }

    /// `value` over un-narrowed R, G, B, A channels.
    pub fn value_wide(self, [r, g, b, a]: [i64; 4]) -> i64 {
        match self {
            ChannelBase::Zero => 0,
            ChannelBase::One => 1,
            ChannelBase::Sum(channels) => {
                let mut sum = 0i64;
                if channels.contains(Channels::R) {
                    sum += r;
                }
                if channels.contains(Channels::G) {
                    sum += g;
                }
                if channels.contains(Channels::B) {
                    sum += b;
                }
                if channels.contains(Channels::A) {
                    sum += a;
                }
                sum
            }
        }
    }
}

/// One output channel of `Raster::edit_channels`: `round(base * multiplier)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelEdit {
    pub base: ChannelBase,
    pub multiplier: f64,
}

impl ChannelEdit {
    pub fn new(base: ChannelBase, multiplier: f64) -> Self {
        Self { base, multiplier }
    }

    /// Copies the sum of `channels` unchanged.
    pub fn keep(channels: Channels) -> Self {
        Self::new(ChannelBase::Sum(channels), 1.0)
    }

    pub fn scaled(channels: Channels, multiplier: f64) -> Self {
        Self::new(ChannelBase::Sum(channels), multiplier)
    }

    pub fn constant(value: u8) -> Self {
        Self::new(ChannelBase::One, value as f64)
    }

    /// Identity edits for R, G, B, A.
    pub fn identity() -> [ChannelEdit; 4] {
        [
            Self::keep(Channels::R),
            Self::keep(Channels::G),
            Self::keep(Channels::B),
            Self::keep(Channels::A),
        ]
    }

    #[inline]
    pub fn apply(&self, color: Color) -> i64 {
        self.apply_wide(widen(color))
    }

    #[inline]
    pub fn apply_wide(&self, channels: [i64; 4]) -> i64 {
        (self.base.value_wide(channels) as f64 * self.multiplier).round() as i64
    }
}

/// Which neighbors must match the background for a pixel to be a straggler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Up, down, left, right.
    Four,
    /// All eight surrounding cells.
    Eight,
}

impl Neighborhood {
    fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        match self {
            Neighborhood::Four => &FOUR,
            Neighborhood::Eight => &EIGHT,
        }
    }
}

/// Per-channel bucket counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub red: Vec<u64>,
    pub green: Vec<u64>,
    pub blue: Vec<u64>,
    pub alpha: Vec<u64>,
}

impl Histogram {
    pub fn bucket_count(&self) -> usize {
        self.red.len()
    }

    /// Number of pixels counted (the same for every channel).
    pub fn total(&self) -> u64 {
        self.red.iter().sum()
    }
}

/// Near-white or near-black by R+G+B sum.
pub fn is_extreme(color: Color) -> bool {
    let sum = color.rgb_sum();
    sum > EXTREME_HIGH_SUM || sum < EXTREME_LOW_SUM
}

impl Raster {
    pub fn invert(&mut self) {
        self.map_in_place(Color::invert);
    }

    /// Unweighted-average grayscale.
    pub fn grayscale(&mut self) {
        self.map_in_place(Color::gray);
    }

    /// Luma-weighted grayscale.
    pub fn perceived_grayscale(&mut self) {
        self.map_in_place(Color::perceived_gray);
    }

    pub fn invert_brightness(&mut self, policy: BrightnessInversion) {
        self.map_in_place(|c| c.invert_brightness(policy));
    }

    /// Generic channel arithmetic; `edits` are the R, G, B, A outputs.
    pub fn edit_channels(&mut self, edits: &[ChannelEdit; 4], overflow: Overflow) {
        self.map_in_place(|c| edit_color(c, edits, overflow));
    }

    /// Runs `stages` in order on wide intermediates and narrows once at the
    /// end, so values pushed out of range by one stage can be brought back
    /// by a later one.
    pub fn edit_channels_staged(&mut self, stages: &[[ChannelEdit; 4]], overflow: Overflow) {
        self.map_in_place(|c| {
            let wide = stages
                .iter()
                .fold(widen(c), |acc, edits| edits.map(|e| e.apply_wide(acc)));
            Color::from_ints_with(wide[0], wide[1], wide[2], wide[3], overflow)
        });
    }

    /// `edit_channels` restricted to pixels whose R+G+B exceeds `cutoff`.
    pub fn edit_channels_above(&mut self, edits: &[ChannelEdit; 4], overflow: Overflow, cutoff: u32) {
        self.map_in_place(|c| {
            if c.rgb_sum() > cutoff {
                edit_color(c, edits, overflow)
            } else {
                c
            }
        });
    }

    /// Scales R, G and B by `factor`, saturating.
    pub fn intensify(&mut self, factor: f64) {
        self.edit_channels(&intensify_edits(factor), Overflow::Saturate);
    }

    /// `intensify` for bright pixels only.
    pub fn intensify_above(&mut self, cutoff: u32, factor: f64) {
        self.edit_channels_above(&intensify_edits(factor), Overflow::Saturate, cutoff);
    }

    /// Replaces every pixel within `leniency` (by `fast_diff`) of `from`.
    /// Returns the number of pixels replaced.
    pub fn replace_color(&mut self, from: Color, to: Color, leniency: u32) -> usize {
        let mut replaced = 0;
        for px in self.pixels.iter_mut() {
            if px.fast_diff(from) <= leniency {
                *px = to;
                replaced += 1;
            }
        }
        replaced
    }

    /// Max absolute R, G, B differences against the right, down and
    /// down-right neighbors; a missing neighbor is the pixel itself.
    fn neighbor_differences(&self, x: usize, y: usize) -> [u8; 3] {
        let here = self.pixel(x, y);
        let right = if x + 1 < self.width { x + 1 } else { x };
        let down = if y + 1 < self.height { y + 1 } else { y };
        let mut out = [0u8; 3];
        for (nx, ny) in [(right, y), (x, down), (right, down)] {
            let there = self.pixel(nx, ny);
            out[0] = out[0].max(here.r.abs_diff(there.r));
            out[1] = out[1].max(here.g.abs_diff(there.g));
            out[2] = out[2].max(here.b.abs_diff(there.b));
        }
        out
    }

    /// Colored difference map (opaque).
    pub fn difference_map(&self) -> Raster {
        let mut out = Raster::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b] = self.neighbor_differences(x, y);
                out.set_pixel(x, y, Color::rgb(r, g, b));
            }
        }
        out
    }

    /// Grayscale edge map: the largest channel difference in R, G and B.
    pub fn edge_map(&self) -> Raster {
        let mut out = Raster::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = self.neighbor_differences(x, y).into_iter().max().unwrap_or(0);
                out.set_pixel(x, y, Color::rgb(v, v, v));
            }
        }
        out
    }

    /// Pushes extreme pixels further out (`min(255, c*c/128)`); mid-tones are untouched.
    pub fn intensify_extremes(&mut self) {
        let push = |c: u8| ((c as u32 * c as u32) / 128).min(255) as u8;
        self.map_in_place(|c| {
            if is_extreme(c) {
                Color::new(push(c.r), push(c.g), push(c.b), c.a)
            } else {
                c
            }
        });
    }

    /// Paints extreme pixels `extreme` and every other pixel `other`.
    pub fn map_of_extremes(&self, extreme: Color, other: Color) -> Raster {
        self.map(|c| if is_extreme(c) { extreme } else { other })
    }

    /// Buckets each channel's `0..=255` range into `buckets` equal-width bins
    /// (clamped to `1..=256`).
    pub fn histogram(&self, buckets: usize) -> Histogram {
        let buckets = buckets.clamp(1, 256);
        let bin = |v: u8| v as usize * buckets / 256;
        let mut hist = Histogram {
            red: vec![0; buckets],
            green: vec![0; buckets],
            blue: vec![0; buckets],
            alpha: vec![0; buckets],
        };
        for c in &self.pixels {
            hist.red[bin(c.r)] += 1;
            hist.green[bin(c.g)] += 1;
            hist.blue[bin(c.b)] += 1;
            hist.alpha[bin(c.a)] += 1;
        }
        hist
    }

    /// Replaces isolated non-background pixels whose in-bounds neighbors are
    /// all `background`. Decisions are made against the unmodified raster.
    /// Returns the number of pixels replaced.
    pub fn remove_stragglers(
        &mut self,
        background: Color,
        replacement: Color,
        neighborhood: Neighborhood,
    ) -> usize {
        let mut stragglers = Vec::new();
        for y in 0..self.height as isize {
            for x in 0..self.width as isize {
                if self.pixel(x as usize, y as usize) == background {
                    continue;
                }
                let surrounded = neighborhood
                    .offsets()
                    .iter()
                    .filter_map(|(dx, dy)| self.get(x + dx, y + dy))
                    .all(|n| n == background);
                if surrounded {
                    stragglers.push((x as usize, y as usize));
                }
            }
        }
        debug!("remove_stragglers: {} pixels replaced", stragglers.len());
        for &(x, y) in &stragglers {
            self.set_pixel(x, y, replacement);
        }
        stragglers.len()
    }
}

#[inline]
fn widen(c: Color) -> [i64; 4] {
    c.to_array().map(i64::from)
}

fn edit_color(c: Color, edits: &[ChannelEdit; 4], overflow: Overflow) -> Color {
    Color::from_ints_with(
        edits[0].apply(c),
        edits[1].apply(c),
        edits[2].apply(c),
        edits[3].apply(c),
        overflow,
    )
}

fn intensify_edits(factor: f64) -> [ChannelEdit; 4] {
    [
        ChannelEdit::scaled(Channels::R, factor),
        ChannelEdit::scaled(Channels::G, factor),
        ChannelEdit::scaled(Channels::B, factor),
        ChannelEdit::keep(Channels::A),
    ]
}
