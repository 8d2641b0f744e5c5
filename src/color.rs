// src/color.rs

//! Defines the `Color` value type used by every raster in the crate, together
//! with its blending rules and its human-readable string forms.
//!
//! A `Color` is four straight (non-premultiplied) 8-bit channels in R, G, B, A
//! order. It is `Copy` and compared by value; there is no identity to share.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two colors are "fast-similar" when no channel differs by more than this.
pub const FAST_SIMILAR_TOLERANCE: u8 = 16;

// Luma weights (out of 100) for perceived grayness.
const LUMA_R: u32 = 30;
const LUMA_G: u32 = 59;
const LUMA_B: u32 = 11;

// Uniform-scale search used by `BrightnessInversion::PreserveRatios`.
const INVERSION_ITERATIONS: usize = 25;
const INVERSION_STEP_DAMPING: f64 = 0.8;

/// Policy applied when wide integer channel values are narrowed to `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Clamp into `0..=255`.
    #[default]
    Saturate,
    /// Keep the low 8 bits. Staged arithmetic that must survive overflow goes
    /// through `Raster::edit_channels_staged`, which narrows only once.
    Wrap,
}

impl Overflow {
    #[inline]
    pub fn narrow(self, value: i64) -> u8 {
        match self {
            Overflow::Saturate => value.clamp(0, 255) as u8,
            Overflow::Wrap => value as u8,
        }
    }
}

/// How `Color::invert_brightness` maps a color to its brightness opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessInversion {
    /// Scale every channel by `(255 - perceived_grayness) / 255`.
    Scale,
    /// Search for one uniform factor that lands the perceived grayness on
    /// `255 - perceived_grayness`, keeping the channel ratios.
    PreserveRatios,
}

/// An RGBA color, 8 bits per channel, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Fully transparent black; the initial value of every new raster cell.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Builds a color from wide integers, saturating each channel to `0..=255`.
    pub fn from_ints(r: i64, g: i64, b: i64, a: i64) -> Self {
        Self::from_ints_with(r, g, b, a, Overflow::Saturate)
    }

    /// Builds a color from wide integers with an explicit overflow policy.
    pub fn from_ints_with(r: i64, g: i64, b: i64, a: i64, overflow: Overflow) -> Self {
        Self {
            r: overflow.narrow(r),
            g: overflow.narrow(g),
            b: overflow.narrow(b),
            a: overflow.narrow(a),
        }
    }

    /// Channels in R, G, B, A order.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Sum of the R, G and B channels (0..=765).
    #[inline]
    pub fn rgb_sum(self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    /// Linear interpolation; `amount_of_a` is clamped to `[0, 1]`.
    /// `0.0` yields `b`, `1.0` yields `a`.
    pub fn intermix(a: Color, b: Color, amount_of_a: f64) -> Color {
        let t = if amount_of_a.is_nan() {
            0.0
        } else {
            amount_of_a.clamp(0.0, 1.0)
        };
        let mix = |ca: u8, cb: u8| (ca as f64 * t + cb as f64 * (1.0 - t)).round() as u8;
        Color::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
    }

    /// Composites `self` as foreground over an opaque `background`.
    ///
    /// The result is always opaque.
    pub fn draw_transparently_onto(self, background: Color) -> Color {
        if self.a == 255 {
            return self;
        }
        let alpha = self.a as f64 / 255.0;
        let blend = |fg: u8, bg: u8| (fg as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8;
        Color::rgb(
            blend(self.r, background.r),
            blend(self.g, background.g),
            blend(self.b, background.b),
        )
    }

    /// Porter-Duff "over" with straight alpha.
    ///
    /// Over an opaque destination this is `draw_transparently_onto`; over a
    /// fully transparent destination the source is returned unchanged.
    pub fn over(self, dst: Color) -> Color {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        if dst.a == 255 {
            return self.draw_transparently_onto(dst);
        }
        let sa = self.a as f64 / 255.0;
        let da = dst.a as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel = |s: u8, d: u8| {
            ((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a).round() as u8
        };
        Color::new(
            channel(self.r, dst.r),
            channel(self.g, dst.g),
            channel(self.b, dst.b),
            (out_a * 255.0).round() as u8,
        )
    }

    /// Per-channel product, normalised so that 255 is the identity.
    pub fn multiply(self, other: Color) -> Color {
        let mul = |x: u8, y: u8| ((x as u32 * y as u32 + 127) / 255) as u8;
        Color::new(
            mul(self.r, other.r),
            mul(self.g, other.g),
            mul(self.b, other.b),
            mul(self.a, other.a),
        )
    }

    pub fn min(self, other: Color) -> Color {
        Color::new(
            self.r.min(other.r),
            self.g.min(other.g),
            self.b.min(other.b),
            self.a.min(other.a),
        )
    }

    pub fn max(self, other: Color) -> Color {
        Color::new(
            self.r.max(other.r),
            self.g.max(other.g),
            self.b.max(other.b),
            self.a.max(other.a),
        )
    }

    /// Inverts R, G and B; alpha is kept.
    pub fn invert(self) -> Color {
        Color::new(255 - self.r, 255 - self.g, 255 - self.b, self.a)
    }

    /// Unweighted average of R, G, B.
    pub fn grayness(self) -> u8 {
        (self.rgb_sum() / 3) as u8
    }

    /// Luma-weighted (30/59/11) grayness.
    pub fn perceived_grayness(self) -> u8 {
        ((LUMA_R * self.r as u32 + LUMA_G * self.g as u32 + LUMA_B * self.b as u32) / 100) as u8
    }

    /// `grayness` as a gray color with the original alpha.
    pub fn gray(self) -> Color {
        let v = self.grayness();
        Color::new(v, v, v, self.a)
    }

    /// `perceived_grayness` as a gray color with the original alpha.
    pub fn perceived_gray(self) -> Color {
        let v = self.perceived_grayness();
        Color::new(v, v, v, self.a)
    }

    /// True when every channel (alpha included) differs by at most 16.
    pub fn is_fast_similar(self, other: Color) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(x, y)| x.abs_diff(*y) <= FAST_SIMILAR_TOLERANCE)
    }

    /// Sum of the absolute per-channel differences, alpha included.
    pub fn fast_diff(self, other: Color) -> u32 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(x, y)| x.abs_diff(*y) as u32)
            .sum()
    }

    fn scaled(self, factor: f64) -> Color {
        let s = |c: u8| (c as f64 * factor).round() as i64;
        Color::from_ints(s(self.r), s(self.g), s(self.b), self.a as i64)
    }

    /// Maps a color to one of opposite brightness. Alpha is kept.
    pub fn invert_brightness(self, policy: BrightnessInversion) -> Color {
        let gray = self.perceived_grayness();
        match policy {
            BrightnessInversion::Scale => self.scaled((255 - gray) as f64 / 255.0),
            BrightnessInversion::PreserveRatios => {
                let target = 255 - gray;
                if gray == 0 {
                    // No ratios to preserve on pure black.
                    return Color::new(target, target, target, self.a);
                }
                let mut factor = 1.0_f64;
                let mut step = 1.0_f64;
                let mut best = self;
                for _ in 0..INVERSION_ITERATIONS {
                    best = self.scaled(factor);
                    let current = best.perceived_grayness();
                    if current == target {
                        break;
                    }
                    if current < target {
                        factor += step;
                    } else {
                        factor = (factor - step).max(0.0);
                    }
                    step *= INVERSION_STEP_DAMPING;
                }
                best
            }
        }
    }

    /// Strict parser for `rgb(...)`, `rgba(...)`, `#RGB`, `#RGBA`,
    /// `#RRGGBB` and `#RRGGBBAA`. Case and whitespace are ignored.
    pub fn parse(input: &str) -> Option<Color> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(hex) = compact.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = compact.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
            let [r, g, b, a] = parse_components::<4>(body)?;
            return Some(Color::from_ints(r, g, b, a));
        }
        if let Some(body) = compact.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let [r, g, b] = parse_components::<3>(body)?;
            return Some(Color::from_ints(r, g, b, 255));
        }
        None
    }

    /// Lenient parser: malformed input logs a warning and yields opaque white.
    pub fn from_string(input: &str) -> Color {
        Color::parse(input).unwrap_or_else(|| {
            warn!("Unparseable color string {:?}; using opaque white.", input);
            Color::WHITE
        })
    }

    /// Canonical `rgba(r, g, b, a)` form.
    pub fn to_css_string(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// `#RRGGBB` form; alpha is dropped.
    pub fn to_hex_string(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn parse_components<const N: usize>(body: &str) -> Option<[i64; N]> {
    let mut out = [0i64; N];
    let mut parts = body.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_css_string()
    }
}

impl From<String> for Color {
    fn from(value: String) -> Color {
        Color::from_string(&value)
    }
}
