// src/codec/pnm.rs

//! Binary Netpbm: P4 (bitmap), P5 (graymap) and P6 (pixmap).
//!
//! Header tokens are separated by whitespace and may be interleaved with `#`
//! comments running to end of line. Exactly one whitespace byte separates
//! the last header token from the sample data. Samples wider than a byte
//! (max value above 255) are big-endian `u16`. Every decoded sample is
//! rescaled to 0..=255; encoding always writes max value 255.

use crate::color::Color;
use crate::raster::Raster;
use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmFormat {
    /// P4, one bit per pixel, 1 is black.
    Pbm,
    /// P5, one gray sample per pixel.
    Pgm,
    /// P6, R,G,B samples per pixel.
    Ppm,
}

impl PnmFormat {
    fn magic(self) -> &'static [u8; 2] {
        match self {
            PnmFormat::Pbm => b"P4",
            PnmFormat::Pgm => b"P5",
            PnmFormat::Ppm => b"P6",
        }
    }

    fn from_magic(magic: &[u8]) -> Option<PnmFormat> {
        match magic {
            b"P4" => Some(PnmFormat::Pbm),
            b"P5" => Some(PnmFormat::Pgm),
            b"P6" => Some(PnmFormat::Ppm),
            _ => None,
        }
    }
}

/// True when `bytes` start with a supported Netpbm magic number.
pub fn is_pnm(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && PnmFormat::from_magic(&bytes[..2]).is_some()
}

/// Cursor over the header tokens.
struct Header<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Header<'a> {
    fn skip_space_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self, what: &str) -> Result<usize> {
        self.skip_space_and_comments();
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            bail!("expected {} at byte {}", what, start);
        }
        // Digits only, so this is valid UTF-8.
        let text = std::str::from_utf8(&self.bytes[start..self.pos])?;
        text.parse()
            .with_context(|| format!("{} {:?} out of range", what, text))
    }

    /// Consumes the single whitespace byte that ends the header.
    fn end(mut self) -> Result<&'a [u8]> {
        match self.bytes.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => {
                self.pos += 1;
                Ok(&self.bytes[self.pos..])
            }
            _ => bail!("missing whitespace after header at byte {}", self.pos),
        }
    }
}

/// Rescales a sample in `0..=maxval` to `0..=255`, rounding.
fn rescale(value: usize, maxval: usize) -> u8 {
    if maxval == 255 {
        return value.min(255) as u8;
    }
    ((value.min(maxval) * 255 + maxval / 2) / maxval) as u8
}

fn samples(data: &[u8], count: usize, maxval: usize) -> Result<Vec<u8>> {
    let width = if maxval > 255 { 2 } else { 1 };
    let needed = count
        .checked_mul(width)
        .context("sample data size overflows")?;
    if data.len() < needed {
        bail!("truncated sample data: need {} bytes, have {}", needed, data.len());
    }
    let out = if width == 1 {
        data[..count].iter().map(|&v| rescale(v as usize, maxval)).collect()
    } else {
        data[..needed]
            .chunks_exact(2)
            .map(|pair| rescale(u16::from_be_bytes([pair[0], pair[1]]) as usize, maxval))
            .collect()
    };
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let format = bytes
        .get(..2)
        .and_then(PnmFormat::from_magic)
        .context("not a binary netpbm file")?;
    let mut header = Header { bytes, pos: 2 };
    let width = header.number("width")?;
    let height = header.number("height")?;
    let maxval = match format {
        PnmFormat::Pbm => 1,
        _ => header.number("max value")?,
    };
    if maxval == 0 || maxval > u16::MAX as usize {
        bail!("max value {} out of range", maxval);
    }
    let data = header.end()?;
    let count = width
        .checked_mul(height)
        .context("image dimensions overflow")?;

    let pixels = match format {
        PnmFormat::Pbm => {
            let stride = width.div_ceil(8);
            let needed = stride
                .checked_mul(height)
                .context("image dimensions overflow")?;
            if data.len() < needed {
                bail!("truncated bitmap: need {} bytes, have {}", needed, data.len());
            }
            let mut pixels = Vec::with_capacity(count);
            for y in 0..height {
                let row = &data[y * stride..(y + 1) * stride];
                for x in 0..width {
                    let bit = row[x / 8] & (0x80 >> (x % 8));
                    pixels.push(if bit != 0 { Color::BLACK } else { Color::WHITE });
                }
            }
            pixels
        }
        PnmFormat::Pgm => samples(data, count, maxval)?
            .into_iter()
            .map(|v| Color::rgb(v, v, v))
            .collect(),
        PnmFormat::Ppm => samples(
            data,
            count.checked_mul(3).context("image dimensions overflow")?,
            maxval,
        )?
            .chunks_exact(3)
            .map(|rgb| Color::rgb(rgb[0], rgb[1], rgb[2]))
            .collect(),
    };
    Ok(Raster::from_pixels(width, height, pixels))
}

/// Encodes `raster`, dropping alpha. Gray uses perceived grayness; a bitmap
/// pixel is black when its perceived grayness is below 128.
pub fn encode(raster: &Raster, format: PnmFormat) -> Vec<u8> {
    let (width, height) = raster.dimensions();
    let mut out = Vec::new();
    out.extend_from_slice(format.magic());
    out.extend_from_slice(format!("\n{} {}\n", width, height).as_bytes());
    match format {
        PnmFormat::Pbm => {
            let stride = width.div_ceil(8);
            for y in 0..height {
                let mut row = vec![0u8; stride];
                for (x, color) in raster.row(y).iter().enumerate() {
                    if color.perceived_grayness() < 128 {
                        row[x / 8] |= 0x80 >> (x % 8);
                    }
                }
                out.extend_from_slice(&row);
            }
        }
        PnmFormat::Pgm => {
            out.extend_from_slice(b"255\n");
            out.extend(raster.pixels().iter().map(|c| c.perceived_grayness()));
        }
        PnmFormat::Ppm => {
            out.extend_from_slice(b"255\n");
            out.extend(raster.pixels().iter().flat_map(|c| [c.r, c.g, c.b]));
        }
    }
    out
}
