// src/codec/image_io.rs

//! PNG, BMP and JPEG through the `image` crate.

use crate::raster::Raster;
use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Decodes any format `image` recognises into straight-alpha RGBA.
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let rgba = image::load_from_memory(bytes)
        .context("Failed to decode image")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_rgba_bytes(width as usize, height as usize, rgba.as_raw())
}

pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let (width, height) = raster.dimensions();
    let buffer = RgbaImage::from_raw(width as u32, height as u32, raster.to_rgba_bytes())
        .context("Raster does not fit an RGBA image buffer")?;
    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use test_log::test;

    #[test]
    fn test_png_keeps_alpha() {
        let mut raster = Raster::filled(4, 3, Color::new(10, 20, 30, 128));
        raster.put(0, 0, Color::TRANSPARENT);
        let png = encode_png(&raster).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(decode(&png).unwrap(), raster);
    }

    #[test]
    fn test_bmp_decodes_opaque() {
        let image = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        let mut bmp = Cursor::new(Vec::new());
        image.write_to(&mut bmp, ImageFormat::Bmp).unwrap();
        let raster = decode(bmp.get_ref()).unwrap();
        assert_eq!(raster, Raster::filled(2, 2, Color::rgb(1, 2, 3)));
    }
}
